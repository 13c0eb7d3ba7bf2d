//! OpenAPI document with the component schemas of every request and response body.

use crate::derived::RegionName;
use crate::model::{EmploymentStatus, Position, Role};
use crate::serializers::airline::{AirlineDetail, AirlineFull, AirlineSummary};
use crate::serializers::blog::BlogPostOut;
use crate::serializers::review::ReviewOut;
use crate::serializers::user::{LoginRequest, SettingsOut, TokenResponse, UserPublic, UserSelf};
use crate::service::AirlineStats;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(title = "Airline Directory", description = "Airlines, employee reviews, blog and accounts"),
    components(schemas(
        AirlineSummary,
        AirlineFull,
        AirlineDetail,
        AirlineStats,
        RegionName,
        ReviewOut,
        Position,
        EmploymentStatus,
        BlogPostOut,
        UserPublic,
        UserSelf,
        SettingsOut,
        Role,
        LoginRequest,
        TokenResponse,
    ))
)]
pub struct ApiDoc;
