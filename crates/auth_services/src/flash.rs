use actix_web::{
    HttpRequest, HttpResponse,
    cookie::{Cookie, SameSite},
    http::header,
};

/// Name of the cookie carrying the pending flash message.
pub const FLASH_COOKIE: &str = "yelpcamp_flash";

/// Flavour of a flash message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    /// Rendered as an error banner
    Error,
    /// Rendered as a success banner
    Success,
}

impl FlashKind {
    fn as_str(self) -> &'static str {
        match self {
            FlashKind::Error => "error",
            FlashKind::Success => "success",
        }
    }
}

/// A notification shown once on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    /// Banner flavour
    pub kind: FlashKind,
    /// Message text
    pub message: String,
}

impl Flash {
    /// Creates an error flash.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }

    /// Creates a success flash.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    /// Encodes the flash as a cookie value, `<kind>:<hex message>`. Hex
    /// carries no `%`, so cookie percent-decoding leaves it untouched.
    pub fn encode(&self) -> String {
        format!("{}:{}", self.kind.as_str(), hex::encode(&self.message))
    }

    /// Parses a cookie value written by [`Flash::encode`].
    pub fn decode(value: &str) -> Option<Self> {
        let (kind, message) = value.split_once(':')?;
        let kind = match kind {
            "error" => FlashKind::Error,
            "success" => FlashKind::Success,
            _ => return None,
        };
        let message = String::from_utf8(hex::decode(message).ok()?).ok()?;
        Some(Self { kind, message })
    }

    /// Reads the pending flash, if any, from the request cookies.
    pub fn from_request(req: &HttpRequest) -> Option<Self> {
        req.cookie(FLASH_COOKIE)
            .and_then(|cookie| Self::decode(cookie.value()))
    }

    /// Builds the cookie that carries this flash to the next request.
    pub fn to_cookie(&self) -> Cookie<'static> {
        Cookie::build(FLASH_COOKIE, self.encode())
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .finish()
    }

    /// Builds the cookie that clears a consumed flash.
    pub fn removal_cookie() -> Cookie<'static> {
        let mut cookie = Cookie::build(FLASH_COOKIE, "").path("/").finish();
        cookie.make_removal();
        cookie
    }
}

/// Redirects to `location`, optionally carrying a flash.
pub fn redirect(location: &str, flash: Option<Flash>) -> HttpResponse {
    let mut response = HttpResponse::Found();
    response.insert_header((header::LOCATION, location.to_string()));
    if let Some(flash) = flash {
        response.cookie(flash.to_cookie());
    }
    response.finish()
}

/// The page a "redirect back" should go to: the `Referer` header, or `fallback`.
pub fn back_location(req: &HttpRequest, fallback: &str) -> String {
    req.headers()
        .get(header::REFERER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn encoded_flash_survives_a_cookie_trip() {
        let flash = Flash::error("You don't have permission to do that; sorry!");
        assert_eq!(Flash::decode(&flash.encode()), Some(flash));
    }

    #[test]
    fn unknown_kind_is_ignored() {
        assert_eq!(Flash::decode("warning:hi"), None);
        assert_eq!(Flash::decode("no-separator"), None);
    }

    #[test]
    fn flash_is_read_from_the_request() {
        let req = TestRequest::default()
            .cookie(Flash::success("Logged you out!").to_cookie())
            .to_http_request();

        assert_eq!(
            Flash::from_request(&req),
            Some(Flash::success("Logged you out!"))
        );
    }

    #[test]
    fn redirect_sets_location_and_cookie() {
        let response = redirect("/login", Some(Flash::error("nope")));

        assert_eq!(response.status(), actix_web::http::StatusCode::FOUND);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/login"
        );
        let cookie = response.cookies().next().unwrap();
        assert_eq!(cookie.name(), FLASH_COOKIE);
        assert_eq!(cookie.value(), "error:6e6f7065");
    }

    #[test]
    fn percent_signs_are_kept_literally() {
        let flash = Flash::success("Welcome to YelpCamp a%41");
        let req = TestRequest::default()
            .cookie(flash.to_cookie())
            .to_http_request();

        assert_eq!(Flash::from_request(&req), Some(flash));
        assert_eq!(Flash::decode("success:zz"), None);
    }

    #[test]
    fn back_prefers_the_referer() {
        let req = TestRequest::default()
            .insert_header((header::REFERER, "/campgrounds/abc"))
            .to_http_request();
        assert_eq!(back_location(&req, "/campgrounds"), "/campgrounds/abc");

        let req = TestRequest::default().to_http_request();
        assert_eq!(back_location(&req, "/campgrounds"), "/campgrounds");
    }
}
