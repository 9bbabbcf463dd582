#![allow(dead_code)]

use actix_web::{body::MessageBody, cookie::Cookie, dev::ServiceResponse, http::header, test};
use async_trait::async_trait;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};
use uuid::Uuid;

use auth_services::flash::{FLASH_COOKIE, Flash};
use auth_services::jwt::SessionTokens;
use auth_services::middleware::session_cookie;
use auth_services::service::AuthService;
use auth_services::store::MemoryUserStore;
use auth_services::types::SessionUser;
use campgrounds::{
    Author, Campground, CampgroundImage, CampgroundStore, MemoryCampgroundStore, NewCampground,
    NewComment,
};
use image_hosting::{HostedImage, ImageError, ImageHost, ImageUpload};
use web_handlers::{AppState, CampgroundService};

pub const ADMIN_CODE: &str = "krusty";

/// Image host that records calls instead of talking to the network.
#[derive(Default)]
pub struct RecordingImageHost {
    pub uploads: Mutex<Vec<String>>,
    pub destroyed: Mutex<Vec<String>>,
    pub fail_destroy: AtomicBool,
}

impl RecordingImageHost {
    pub fn uploads(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn destroyed(&self) -> Vec<String> {
        self.destroyed.lock().unwrap().clone()
    }

    pub fn break_destroy(&self) {
        self.fail_destroy.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ImageHost for RecordingImageHost {
    async fn upload(&self, image: ImageUpload) -> Result<HostedImage, ImageError> {
        self.uploads.lock().unwrap().push(image.file_name.clone());
        Ok(HostedImage {
            url: format!("https://images.test/{}", image.file_name),
            public_id: format!("yelpcamp/{}", image.file_name),
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<(), ImageError> {
        if self.fail_destroy.load(Ordering::SeqCst) {
            return Err(ImageError::Api("host unavailable".to_string()));
        }
        self.destroyed.lock().unwrap().push(public_id.to_string());
        Ok(())
    }
}

/// In-memory application wiring shared by the route tests.
pub struct Harness {
    pub state: AppState,
    pub store: Arc<MemoryCampgroundStore>,
    pub images: Arc<RecordingImageHost>,
}

impl Harness {
    pub fn new() -> Self {
        let store = Arc::new(MemoryCampgroundStore::new());
        let images = Arc::new(RecordingImageHost::default());
        let auth = AuthService::new(
            Arc::new(MemoryUserStore::new()),
            Some(ADMIN_CODE.to_string()),
        )
        .with_hash_cost(4);

        let state = AppState {
            auth,
            listings: CampgroundService::new(store.clone(), images.clone()),
            tokens: SessionTokens::new("test-secret"),
        };

        Self {
            state,
            store,
            images,
        }
    }

    /// A session user and the cookie that authenticates as them.
    pub fn login(&self, username: &str, is_admin: bool) -> (SessionUser, Cookie<'static>) {
        let user = SessionUser {
            id: Uuid::new_v4(),
            username: username.to_string(),
            is_admin,
        };
        let token = self.state.tokens.issue(&user).unwrap();
        (user, session_cookie(token))
    }

    /// Stores a campground owned by `owner`.
    pub async fn listing(&self, owner: &SessionUser, host_id: Option<&str>) -> Campground {
        self.store
            .insert_campground(NewCampground {
                name: "Kamp Krusty".to_string(),
                price: "20".to_string(),
                description: "Not a lot of fun".to_string(),
                image: CampgroundImage {
                    url: "https://images.test/krusty.jpg".to_string(),
                    host_id: host_id.map(str::to_string),
                },
                author: Author::from(owner),
            })
            .await
            .unwrap()
    }

    pub async fn comment(&self, campground: &Campground, author: &SessionUser, text: &str) -> Uuid {
        self.store
            .add_comment(
                &campground.id,
                NewComment {
                    text: text.to_string(),
                    author: Author::from(author),
                },
            )
            .await
            .unwrap()
            .id
    }

    pub async fn reload(&self, campground: &Campground) -> Option<Campground> {
        self.store.find_campground(&campground.id).await.unwrap()
    }
}

/// Builds the app under test around a harness.
macro_rules! test_app {
    ($harness:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($harness.state.clone()))
                .wrap(web_handlers::MethodOverride)
                .wrap(auth_services::middleware::SessionMiddleware::new(
                    $harness.state.tokens.clone(),
                ))
                .configure(web_handlers::configure),
        )
        .await
    };
}

const BOUNDARY: &str = "----yelpcamp-test-boundary";

/// Encodes text fields and an optional file as `multipart/form-data`.
pub fn multipart(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{}\"\r\nContent-Type: image/png\r\n\r\n",
                BOUNDARY, file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    (format!("multipart/form-data; boundary={}", BOUNDARY), body)
}

/// A POST request carrying a multipart campground form.
pub fn campground_form(
    uri: &str,
    fields: &[(&str, &str)],
    file: Option<(&str, &[u8])>,
) -> test::TestRequest {
    let (content_type, body) = multipart(fields, file);
    test::TestRequest::post()
        .uri(uri)
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(body)
}

pub fn location<B>(resp: &ServiceResponse<B>) -> String {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

pub fn flash<B>(resp: &ServiceResponse<B>) -> Option<Flash> {
    resp.response()
        .cookies()
        .find(|c| c.name() == FLASH_COOKIE)
        .and_then(|c| Flash::decode(c.value()))
}

pub fn cookie<B>(resp: &ServiceResponse<B>, name: &str) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|c| c.name() == name)
        .map(|c| c.into_owned())
}

pub async fn body_text<B: MessageBody>(resp: ServiceResponse<B>) -> String {
    String::from_utf8(test::read_body(resp).await.to_vec()).unwrap()
}
