use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    parse::Parse, parse::ParseStream, parse_macro_input, Attribute, Expr, ItemStruct, Path, Token,
};

/// An imported module type
struct ImportItem {
    attrs: Vec<Attribute>,
    path: Path,
}

impl Parse for ImportItem {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let attrs = input.call(Attribute::parse_outer)?;
        let path = input.parse()?;
        Ok(ImportItem { attrs, path })
    }
}

/// A controller or provider: a bare type (built with `Default`) or any
/// expression producing an instance
struct ComponentItem {
    attrs: Vec<Attribute>,
    expr: Expr,
}

impl Parse for ComponentItem {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let attrs = input.call(Attribute::parse_outer)?;
        let expr = input.parse()?;
        Ok(ComponentItem { attrs, expr })
    }
}

impl ComponentItem {
    fn instance(&self) -> TokenStream2 {
        match &self.expr {
            Expr::Path(path) if path.qself.is_none() => {
                let path = &path.path;
                quote!(<#path as ::core::default::Default>::default())
            }
            expr => quote!(#expr),
        }
    }
}

struct ModuleArgs {
    imports: Vec<ImportItem>,
    controllers: Vec<ComponentItem>,
    providers: Vec<ComponentItem>,
}

impl Parse for ModuleArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut imports = Vec::new();
        let mut controllers = Vec::new();
        let mut providers = Vec::new();

        while !input.is_empty() {
            let name: syn::Ident = input.parse()?;
            input.parse::<Token![=]>()?;

            // Parse array: [Item1, Item2, ...]
            let content;
            syn::bracketed!(content in input);

            if name == "imports" {
                let items = content.parse_terminated(ImportItem::parse, Token![,])?;
                imports = items.into_iter().collect();
            } else if name == "controllers" {
                let items = content.parse_terminated(ComponentItem::parse, Token![,])?;
                controllers = items.into_iter().collect();
            } else if name == "providers" {
                let items = content.parse_terminated(ComponentItem::parse, Token![,])?;
                providers = items.into_iter().collect();
            } else {
                return Err(syn::Error::new(
                    name.span(),
                    "expected `imports`, `controllers` or `providers`",
                ));
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(ModuleArgs {
            imports,
            controllers,
            providers,
        })
    }
}

pub fn module_attribute(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as ModuleArgs);
    let input = parse_macro_input!(item as ItemStruct);
    let expanded = generate_module_impl(&args, &input);

    TokenStream::from(expanded)
}

fn generate_module_impl(args: &ModuleArgs, input: &ItemStruct) -> TokenStream2 {
    let module_name = &input.ident;
    let name = module_name.to_string();

    let imports = args.imports.iter().map(|item| {
        let path = &item.path;
        let attrs = &item.attrs;
        quote! {
            #(#attrs)*
            let builder = builder.import(<#path as ::nestrs::Module>::descriptor());
        }
    });

    let controllers = args.controllers.iter().map(|item| {
        let attrs = &item.attrs;
        let instance = item.instance();
        quote! {
            #(#attrs)*
            let builder = builder.controller(#instance);
        }
    });

    let providers = args.providers.iter().map(|item| {
        let attrs = &item.attrs;
        let instance = item.instance();
        quote! {
            #(#attrs)*
            let builder = builder.provider(#instance);
        }
    });

    quote! {
        #input

        impl ::nestrs::Module for #module_name {
            const NAME: &'static str = #name;

            fn descriptor() -> ::nestrs::ModuleDescriptor {
                let builder = ::nestrs::ModuleDescriptor::builder(Self::NAME);
                #(#imports)*
                #(#providers)*
                #(#controllers)*
                builder.build()
            }
        }
    }
}
