use super::model::{CreateUserRequest, PatchUserRequest, User};
use super::service::UserService;
use nestrs::axum::http::HeaderValue;
use nestrs::axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ALLOW, CONTENT_TYPE, HeaderName,
};
use nestrs::prelude::*;

const ALLOWED_METHODS: &str = "GET, POST, PUT, PATCH, DELETE, HEAD, OPTIONS";

#[derive(Controller)]
#[controller(base_url = "/users")]
pub struct UserController {
    #[inject]
    users: Injected<UserService>,

    #[route("GET /")]
    get_users: Handler<UserController>,
    #[route("POST /")]
    create_user: Handler<UserController>,
    #[route("GET /:id")]
    get_user: Handler<UserController>,
    #[route("PUT /:id")]
    update_user: Handler<UserController>,
    #[route("DELETE /:id")]
    delete_user: Handler<UserController>,
    #[route("PATCH /:id")]
    patch_user: Handler<UserController>,
    #[route("HEAD /")]
    head_users: Handler<UserController>,
    #[route("OPTIONS /")]
    options_users: Handler<UserController>,
}

impl UserController {
    pub fn new() -> Self {
        Self {
            users: Injected::new(),
            get_users: Self::get_users,
            create_user: Self::create_user,
            get_user: Self::get_user,
            update_user: Self::update_user,
            delete_user: Self::delete_user,
            patch_user: Self::patch_user,
            head_users: Self::head_users,
            options_users: Self::options_users,
        }
    }

    fn get_users(&self, _ctx: &mut Context) -> Reply {
        Reply::list(&self.users.all_users())
    }

    fn create_user(&self, ctx: &mut Context) -> Reply {
        let request: CreateUserRequest = match ctx.body_json() {
            Ok(request) => request,
            Err(err) => {
                tracing::warn!(error = %err, "Failed to parse request body");
                ctx.error(StatusCode::BAD_REQUEST, "Invalid request body");
                return Reply::None;
            }
        };

        let user = self.users.create_user(request);
        tracing::info!(id = user.id, "User created");
        ctx.json_with_status(StatusCode::CREATED, &success("User created successfully", &user));
        Reply::None
    }

    fn get_user(&self, ctx: &mut Context) -> Reply {
        let Some(id) = user_id(ctx) else {
            return Reply::None;
        };

        match self.users.user_by_id(id) {
            Some(user) => Reply::data(&user),
            None => {
                ctx.error(StatusCode::NOT_FOUND, "User not found");
                Reply::None
            }
        }
    }

    fn update_user(&self, ctx: &mut Context) -> Reply {
        let Some(id) = user_id(ctx) else {
            return Reply::None;
        };
        let request: CreateUserRequest = match ctx.body_json() {
            Ok(request) => request,
            Err(_) => {
                ctx.error(StatusCode::BAD_REQUEST, "Invalid request body");
                return Reply::None;
            }
        };

        match self.users.update_user(id, request) {
            Some(user) => ctx.json(&success("User updated successfully", &user)),
            None => ctx.error(StatusCode::NOT_FOUND, "User not found or update failed"),
        }
        Reply::None
    }

    fn delete_user(&self, ctx: &mut Context) -> Reply {
        let Some(id) = user_id(ctx) else {
            return Reply::None;
        };

        if self.users.delete_user(id) {
            ctx.json(&Envelope::with_message("User deleted successfully").success());
        } else {
            ctx.error(StatusCode::NOT_FOUND, "User not found or delete failed");
        }
        Reply::None
    }

    fn patch_user(&self, ctx: &mut Context) -> Reply {
        let Some(id) = user_id(ctx) else {
            return Reply::None;
        };
        let patch: PatchUserRequest = if ctx.request().body.is_empty() {
            PatchUserRequest::default()
        } else {
            match ctx.body_json() {
                Ok(patch) => patch,
                Err(_) => {
                    ctx.error(StatusCode::BAD_REQUEST, "Invalid request body");
                    return Reply::None;
                }
            }
        };

        match self.users.patch_user(id, patch) {
            Some(user) => ctx.json(&success("User patched successfully", &user)),
            None => ctx.error(StatusCode::NOT_FOUND, "User not found"),
        }
        Reply::None
    }

    fn head_users(&self, ctx: &mut Context) -> Reply {
        let count = self.users.all_users().len();
        ctx.set_header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        ctx.set_header(HeaderName::from_static("x-total-count"), HeaderValue::from(count));
        ctx.set_status(StatusCode::OK);
        Reply::None
    }

    fn options_users(&self, ctx: &mut Context) -> Reply {
        ctx.set_header(ALLOW, HeaderValue::from_static(ALLOWED_METHODS));
        ctx.set_header(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOWED_METHODS));
        ctx.set_header(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type, Authorization"),
        );
        ctx.set_status(StatusCode::OK);
        Reply::None
    }
}

impl Default for UserController {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse the `id` path parameter, answering 400 when it is not a positive integer
fn user_id(ctx: &mut Context) -> Option<u64> {
    let id = ctx
        .param("id")
        .and_then(|raw| raw.parse::<u64>().ok())
        .filter(|id| *id > 0);
    if id.is_none() {
        ctx.error(StatusCode::BAD_REQUEST, "Invalid user ID");
    }
    id
}

fn success(message: &str, user: &User) -> Envelope {
    Envelope::with_data(serde_json::to_value(user).unwrap_or_default())
        .message(message)
        .success()
}
