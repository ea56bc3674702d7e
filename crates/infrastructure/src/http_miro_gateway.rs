use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use miro_connector_application::{
    CreateScimUserInput, OrganizationContext, OrganizationMember, RateLimitStatus, ScimUser, Team,
    TeamMember, UpstreamGateway, UpstreamPage,
};
use miro_connector_core::{AppError, AppResult, BearerToken};
use miro_connector_domain::TeamRole;

use self::wire::{
    CreateScimUserRequest, ErrorBody, InviteTeamMemberRequest, ListResponse, MemberBody,
    PatchOpRequest, SCIM_USER_SCHEMA, ScimNameBody, ScimUserBody, TeamBody, TeamMemberBody,
    TokenContextResponse,
};

mod rate_limit;
mod wire;

/// Default REST API base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://api.miro.com";

/// Default SCIM API base URL.
pub const DEFAULT_SCIM_BASE_URL: &str = "https://miro.com/api/v1/scim";

/// `reqwest` implementation of the upstream gateway over the REST and SCIM APIs.
#[derive(Clone)]
pub struct HttpMiroGateway {
    http_client: reqwest::Client,
    api_base_url: String,
    scim_base_url: String,
    access_token: BearerToken,
    scim_access_token: Option<BearerToken>,
}

impl HttpMiroGateway {
    /// Creates a gateway.
    ///
    /// Without a SCIM token every SCIM call fails with `NotConfigured`; REST
    /// calls are unaffected.
    #[must_use]
    pub fn new(
        http_client: reqwest::Client,
        api_base_url: impl Into<String>,
        scim_base_url: impl Into<String>,
        access_token: BearerToken,
        scim_access_token: Option<BearerToken>,
    ) -> Self {
        Self {
            http_client,
            api_base_url: api_base_url.into().trim_end_matches('/').to_owned(),
            scim_base_url: scim_base_url.into().trim_end_matches('/').to_owned(),
            access_token,
            scim_access_token,
        }
    }

    fn scim_token(&self) -> AppResult<&BearerToken> {
        self.scim_access_token.as_ref().ok_or_else(|| {
            AppError::NotConfigured("SCIM access token is required for this operation".to_owned())
        })
    }

    fn rest_request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(%method, %url, "calling miro rest api");
        self.http_client
            .request(method, url)
            .header(AUTHORIZATION, self.access_token.authorization_header())
            .header(ACCEPT, "application/json")
    }

    fn scim_request(&self, method: Method, segments: &[&str]) -> AppResult<RequestBuilder> {
        let token = self.scim_token()?;
        let url = endpoint(self.scim_base_url.as_str(), segments)?;
        debug!(%method, %url, "calling miro scim api");

        Ok(self
            .http_client
            .request(method, url)
            .header(AUTHORIZATION, token.authorization_header())
            .header(ACCEPT, "application/json"))
    }

    fn org_url(&self, organization_id: &str, segments: &[&str]) -> AppResult<Url> {
        let mut path = vec!["v2", "orgs", organization_id];
        path.extend_from_slice(segments);
        endpoint(self.api_base_url.as_str(), &path)
    }

    async fn list_page<B, T>(
        &self,
        mut url: Url,
        cursor: Option<&str>,
        limit: u32,
    ) -> AppResult<UpstreamPage<T>>
    where
        B: DeserializeOwned,
        T: From<B>,
    {
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("limit", limit.to_string().as_str());
            if let Some(cursor) = cursor.filter(|cursor| !cursor.is_empty()) {
                query.append_pair("cursor", cursor);
            }
        }

        let response = send(self.rest_request(Method::GET, url)).await?;
        let rate_limit: Option<RateLimitStatus> = rate_limit::from_headers(response.headers());
        let body: ListResponse<B> = decode(response).await?;

        Ok(UpstreamPage {
            data: body.data.into_iter().map(T::from).collect(),
            cursor: body.cursor,
            rate_limit,
        })
    }
}

fn endpoint(base_url: &str, segments: &[&str]) -> AppResult<Url> {
    let mut url = Url::parse(base_url)
        .map_err(|error| AppError::Internal(format!("invalid base url '{base_url}': {error}")))?;

    url.path_segments_mut()
        .map_err(|()| AppError::Internal(format!("base url '{base_url}' cannot carry a path")))?
        .pop_if_empty()
        .extend(segments);

    Ok(url)
}

async fn send(request: RequestBuilder) -> AppResult<Response> {
    let response = request
        .send()
        .await
        .map_err(|error| AppError::Upstream(format!("request failed: {error}")))?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(status_error(status, body.as_str()))
}

async fn decode<T: DeserializeOwned>(response: Response) -> AppResult<T> {
    let bytes = response
        .bytes()
        .await
        .map_err(|error| AppError::Upstream(format!("failed to read response body: {error}")))?;

    serde_json::from_slice(&bytes)
        .map_err(|error| AppError::Upstream(format!("failed to decode response body: {error}")))
}

fn status_error(status: StatusCode, body: &str) -> AppError {
    let detail = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(ErrorBody::into_detail)
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                status.to_string()
            } else {
                body.trim().to_owned()
            }
        });

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            AppError::Unauthorized(format!("miro responded {}: {detail}", status.as_u16()))
        }
        StatusCode::NOT_FOUND => AppError::NotFound(detail),
        _ => AppError::Upstream(format!("miro responded {}: {detail}", status.as_u16())),
    }
}

#[async_trait]
impl UpstreamGateway for HttpMiroGateway {
    async fn organization_context(&self) -> AppResult<OrganizationContext> {
        let url = endpoint(self.api_base_url.as_str(), &["v1", "oauth-token"])?;
        let response = send(self.rest_request(Method::GET, url)).await?;
        let context: TokenContextResponse = decode(response).await?;

        context
            .organization
            .map(OrganizationContext::from)
            .ok_or_else(|| {
                AppError::Upstream("access token is not bound to an organization".to_owned())
            })
    }

    async fn list_organization_members(
        &self,
        organization_id: &str,
        cursor: Option<&str>,
        limit: u32,
    ) -> AppResult<UpstreamPage<OrganizationMember>> {
        let url = self.org_url(organization_id, &["members"])?;
        self.list_page::<MemberBody, _>(url, cursor, limit).await
    }

    async fn get_organization_member(
        &self,
        organization_id: &str,
        user_id: &str,
    ) -> AppResult<OrganizationMember> {
        let url = self.org_url(organization_id, &["members", user_id])?;
        let response = send(self.rest_request(Method::GET, url)).await?;
        decode::<MemberBody>(response).await.map(Into::into)
    }

    async fn list_teams(
        &self,
        organization_id: &str,
        cursor: Option<&str>,
        limit: u32,
    ) -> AppResult<UpstreamPage<Team>> {
        let url = self.org_url(organization_id, &["teams"])?;
        self.list_page::<TeamBody, _>(url, cursor, limit).await
    }

    async fn list_team_members(
        &self,
        organization_id: &str,
        team_id: &str,
        cursor: Option<&str>,
        limit: u32,
    ) -> AppResult<UpstreamPage<TeamMember>> {
        let url = self.org_url(organization_id, &["teams", team_id, "members"])?;
        self.list_page::<TeamMemberBody, _>(url, cursor, limit).await
    }

    async fn invite_team_member(
        &self,
        organization_id: &str,
        team_id: &str,
        email: &str,
        role: TeamRole,
    ) -> AppResult<TeamMember> {
        let url = self.org_url(organization_id, &["teams", team_id, "members"])?;
        let request = self
            .rest_request(Method::POST, url)
            .json(&InviteTeamMemberRequest {
                email,
                role: role.as_str(),
            });

        let response = send(request).await?;
        decode::<TeamMemberBody>(response).await.map(Into::into)
    }

    async fn remove_team_member(
        &self,
        organization_id: &str,
        team_id: &str,
        user_id: &str,
    ) -> AppResult<()> {
        let url = self.org_url(organization_id, &["teams", team_id, "members", user_id])?;
        send(self.rest_request(Method::DELETE, url)).await?;
        Ok(())
    }

    async fn create_scim_user(&self, input: CreateScimUserInput) -> AppResult<OrganizationMember> {
        let request = self
            .scim_request(Method::POST, &["Users"])?
            .json(&CreateScimUserRequest {
                schemas: [SCIM_USER_SCHEMA],
                user_name: input.email.as_str(),
                name: ScimNameBody {
                    given_name: input.first_name,
                    family_name: input.last_name,
                },
            });

        let response = send(request).await?;
        let created: ScimUserBody = decode(response).await?;

        Ok(OrganizationMember {
            email: created.login_email().to_owned(),
            id: created.id,
            active: created.active,
            ..OrganizationMember::default()
        })
    }

    async fn get_scim_user(&self, user_id: &str) -> AppResult<ScimUser> {
        let response = send(self.scim_request(Method::GET, &["Users", user_id])?).await?;
        decode::<ScimUserBody>(response).await.map(Into::into)
    }

    async fn replace_scim_user(&self, user_id: &str, user: &ScimUser) -> AppResult<ScimUser> {
        let request = self
            .scim_request(Method::PUT, &["Users", user_id])?
            .json(&ScimUserBody::from(user));

        let response = send(request).await?;
        decode::<ScimUserBody>(response).await.map(Into::into)
    }

    async fn update_scim_user_role(&self, user_id: &str, role_key: &str) -> AppResult<ScimUser> {
        let request = self
            .scim_request(Method::PATCH, &["Users", user_id])?
            .json(&PatchOpRequest::replace_role(role_key));

        let response = send(request).await?;
        decode::<ScimUserBody>(response).await.map(Into::into)
    }
}
