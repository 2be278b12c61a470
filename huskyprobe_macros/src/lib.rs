// This file is part of huskyprobe, a tool to verify the parameter surface of ChipWhisperer Husky capture devices.
//
// Copyright 2025 Canonical Ltd.
//
// SPDX-License-Identifier: GPL-3.0-only
//
// huskyprobe is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License version 3, as published by the Free Software Foundation.
//
// huskyprobe is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranties of MERCHANTABILITY, SATISFACTORY QUALITY, or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with this program.  If not, see http://www.gnu.org/licenses/.

//! Procedural macros for huskyprobe.

use proc_macro::TokenStream;
use quote::quote;
use syn::{ItemStruct, LitStr, parse_macro_input};

/// Mark a struct as a backend registered under `name`.
///
/// The struct must provide a `new()` constructor and implement `Backend`. The macro keeps
/// the struct as written and adds an associated `register_backend()` function which puts
/// the constructor into the backend registry.
///
/// ```rust,ignore
/// #[backend(name = "husky-sim")]
/// pub struct SimHuskyBackend { /* ... */ }
///
/// SimHuskyBackend::register_backend();
/// ```
#[proc_macro_attribute]
pub fn backend(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut name: Option<LitStr> = None;
    let parser = syn::meta::parser(|meta| {
        if meta.path.is_ident("name") {
            name = Some(meta.value()?.parse()?);
            Ok(())
        } else {
            Err(meta.error("unsupported backend property, expected `name`"))
        }
    });
    parse_macro_input!(attr with parser);
    let item = parse_macro_input!(item as ItemStruct);

    let Some(name) = name else {
        return syn::Error::new_spanned(&item.ident, "#[backend] requires `name = \"...\"`")
            .to_compile_error()
            .into();
    };

    let ident = &item.ident;
    let (impl_generics, ty_generics, where_clause) = item.generics.split_for_impl();

    quote! {
        #item

        impl #impl_generics #ident #ty_generics #where_clause {
            /// Name this backend is registered under.
            pub const BACKEND_NAME: &'static str = #name;

            /// Add this backend to the global backend registry.
            pub fn register_backend() {
                crate::backends::backend::register_backend(#name, || {
                    ::std::boxed::Box::new(#ident::new())
                });
            }
        }
    }
    .into()
}
