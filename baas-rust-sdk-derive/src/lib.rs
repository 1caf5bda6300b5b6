//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
extern crate proc_macro;
extern crate proc_macro2;
extern crate syn;
#[macro_use]
extern crate quote;

use proc_macro::TokenStream;
use proc_macro2::{TokenStream as TokenStream2, TokenTree};
use syn::{parse_macro_input, Data, DeriveInput, Meta};

/// Derive macro to let a struct be written directly into, and read directly from,
/// a BaaS document store record.
///
/// The single `baas` attribute can be used to rename a field using the `column`
/// key, for example when a record field name is not a valid Rust identifier.
///
/// See the documentation of `Table::create()` in the main SDK crate for example
/// usage of this macro to create and find native structs in a collection.
#[proc_macro_derive(BaasRow, attributes(baas))]
pub fn to_from_map_value(input: TokenStream) -> TokenStream {
    // Parse input tokens into a syntax tree
    let input = parse_macro_input!(input as DeriveInput);

    // Build the trait implementation
    impl_to_from_map_value(input)
}

struct ColumnSpec {
    fname: String,
    alias: Option<String>,
}

// Pull an optional `column = name` alias out of a field's `baas(...)` attributes.
fn column_alias(attrs: &Vec<syn::Attribute>) -> Option<String> {
    for a in attrs {
        let Meta::List(l) = &a.meta else {
            continue;
        };
        if !l.path.segments.iter().any(|s| s.ident == "baas") {
            continue;
        }
        let mut is_column = false;
        for t in l.tokens.clone() {
            if let TokenTree::Ident(i) = t {
                if is_column {
                    return Some(i.to_string());
                }
                is_column = i.to_string() == "column";
            }
        }
    }
    None
}

fn impl_to_from_map_value(input: DeriveInput) -> TokenStream {
    let name = &input.ident;
    let name_string = name.to_string();

    // only Struct datatypes are supported (vs Enum vs Union)
    let ds = if let Data::Struct(d) = input.data {
        d
    } else {
        panic!("BaasRow only supports Struct datatypes");
    };

    let mut columns: Vec<ColumnSpec> = Vec::new();
    for field in ds.fields {
        let alias = column_alias(&field.attrs);
        let fname = if let Some(id) = field.ident {
            id.to_string()
        } else {
            panic!("Field in BaasRow is missing ident");
        };
        columns.push(ColumnSpec { fname, alias });
    }

    let mut tbody = TokenStream2::default();
    let mut fbody = TokenStream2::default();
    for c in columns {
        let fname = format_ident!("{}", c.fname);
        let fnameq = match c.alias {
            Some(s) => s,
            None => c.fname,
        };
        tbody.extend(quote! {
            m.put(#fnameq, &self.#fname);
        });
        fbody.extend(quote! {
            self.#fname = self.#fname.from_map(#fnameq, value)?;
        });
    }

    let expanded = quote! {
        impl BaasRow for #name {
            fn to_map_value(&self) -> Result<MapValue, baas_rust_sdk::BaasError> {
                let mut m = MapValue::new();
                #tbody
                Ok(m)
            }

            fn from_map_value(&mut self, value: &MapValue) -> Result<(), baas_rust_sdk::BaasError> {
                #fbody
                Ok(())
            }
        }

        impl ToFieldValue for #name {
            fn to_field_value(&self) -> FieldValue {
                if let Ok(mv) = self.to_map_value() {
                    return FieldValue::Map(mv);
                }
                FieldValue::Null
            }
        }

        impl FromFieldValue for #name {
            fn from_field(fv: &FieldValue) -> Result<Self, baas_rust_sdk::BaasError> {
                if let FieldValue::Map(v) = fv {
                    let mut s: #name = Default::default();
                    s.from_map_value(v)?;
                    return Ok(s);
                }
                Err(baas_rust_sdk::BaasError::new(
                    baas_rust_sdk::BaasErrorCode::InvalidParam,
                    format!("error converting field into {}: expected FieldValue::Map, actual: {:?}", #name_string, fv).as_str()))
            }
        }

    };

    // Return the generated impl
    TokenStream::from(expanded)
}
