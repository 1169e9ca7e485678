use crate::api::reports::{ReportQuery, ReportResponse, ReportRow};
use crate::api::users::UserListResponse;
use crate::auth::handlers::LoginResponse;
use crate::model::action::{ClockAction, Rejection};
use crate::model::attendance::{AttendanceStatus, AttendanceView};
use crate::model::user::UserProfile;
use crate::models::LoginReqDto;
use crate::service::{Dashboard, DashboardRow};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Time Clock API",
        version = "1.0.0",
        description = r#"
## Employee Time Clock

Employees pick themselves from the list of active users, confirm with their
password and punch the clock for the current day.

### 🔹 Key Features
- **Clock**
  - Clock in, start and end a single break, clock out
- **Dashboard**
  - Today's status of every active employee
- **Reports**
  - Filter by date range and user, export as CSV or PDF

### 🔐 Security
`POST /auth/login` returns a short-lived **JWT Bearer** clock token required by
the `/clock` endpoints. A token is spent by its first punch; `POST /auth/clear`
revokes it without punching.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::users::list_users,
        crate::auth::handlers::login,
        crate::auth::handlers::clear,

        crate::api::attendance::today,
        crate::api::attendance::clock_action,

        crate::api::dashboard::dashboard,

        crate::api::reports::list_reports,
        crate::api::reports::export_csv,
        crate::api::reports::export_pdf
    ),
    components(
        schemas(
            UserProfile,
            UserListResponse,
            LoginReqDto,
            LoginResponse,
            ClockAction,
            Rejection,
            AttendanceStatus,
            AttendanceView,
            Dashboard,
            DashboardRow,
            ReportQuery,
            ReportRow,
            ReportResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Users", description = "User selection"),
        (name = "Auth", description = "Password check and clock token"),
        (name = "Clock", description = "Clock in/out and breaks"),
        (name = "Dashboard", description = "Today's overview"),
        (name = "Reports", description = "History and exports"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
