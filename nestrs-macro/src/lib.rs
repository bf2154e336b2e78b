use proc_macro::TokenStream;

mod component;
mod module;

/// Derive macro describing a service to the container
///
/// Fields marked `#[inject]` receive registered instances at startup.
///
/// # Example
/// ```ignore
/// use nestrs::prelude::*;
///
/// #[derive(Service, Default)]
/// pub struct UserService {
///     #[inject("FakeDatabase")]
///     database: Injected<FakeDatabase>,
/// }
/// ```
#[proc_macro_derive(Service, attributes(inject))]
pub fn derive_service(input: TokenStream) -> TokenStream {
    component::derive_service(input)
}

/// Derive macro describing a controller: base URL, injected fields and route
/// handler fields
///
/// # Example
/// ```ignore
/// use nestrs::prelude::*;
///
/// #[derive(Controller)]
/// #[controller(base_url = "/users")]
/// pub struct UserController {
///     #[inject]
///     users: Injected<UserService>,
///
///     #[route("GET /:id")]
///     get_user: Handler<UserController>,
/// }
/// ```
#[proc_macro_derive(Controller, attributes(controller, inject, route, http))]
pub fn derive_controller(input: TokenStream) -> TokenStream {
    component::derive_controller(input)
}

/// Attribute macro for defining a module with imports, controllers and providers
///
/// Bare type names are constructed with `Default`; any other expression is
/// used as the instance.
///
/// # Example
/// ```ignore
/// use nestrs::module;
///
/// #[module(
///     controllers = [UserController::new()],
///     providers = [UserService, FakeDatabase::seeded()],
/// )]
/// pub struct UserModule;
/// ```
#[proc_macro_attribute]
pub fn module(attr: TokenStream, item: TokenStream) -> TokenStream {
    module::module_attribute(attr, item)
}
