use std::net::Ipv4Addr;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use curtainlink_mock::MockHub;
use curtainlink_server::app::{AppContext, create_context, create_router};
use curtainlink_server::configs::{Curtain, Database, Hub, Logger, Server, Settings};
use curtainlink_server::services::TcpHubConnector;
use serde_json::Value;
use tower::ServiceExt;

pub const IDENTITY: &str = "aa:bb:cc:dd:ee:ff";
pub const IDENTITY_BYTES: [u8; 6] = [0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff];

pub const LIVING_ROOM_OPEN: &[u8] = &[0x26, 0x01, 0x0a];
pub const LIVING_ROOM_STOP: &[u8] = &[0x26, 0x01, 0x0c];
pub const BEDROOM_OPEN: &[u8] = &[0x26, 0x02, 0x0a];
pub const BEDROOM_STOP: &[u8] = &[0x26, 0x02, 0x0c];

pub struct MockApp {
    pub hub: MockHub,
    pub context: AppContext,
    pub router: Router,
}

impl MockApp {
    pub async fn new() -> Self {
        let hub = MockHub::bind((Ipv4Addr::LOCALHOST, 0).into(), IDENTITY_BYTES.to_vec())
            .await
            .unwrap();

        let settings = Settings {
            server: Server {
                host: String::from("127.0.0.1"),
                port: 0,
            },
            logger: Logger {
                level: String::from("debug"),
            },
            database: Database {
                url: String::from("sqlite::memory:"),
                clean_start: true,
            },
            hub: Hub {
                host: String::from("127.0.0.1"),
                port: hub.address().port(),
                identity: String::from(IDENTITY),
                timeout: 2,
            },
            curtains: vec![
                Curtain {
                    name: String::from("Living Room"),
                    open_code: String::from("26010a"),
                    close_code: String::from("26010b"),
                    stop_code: String::from("26010c"),
                    move_time: 1,
                },
                Curtain {
                    name: String::from("Bedroom"),
                    open_code: String::from("26020a"),
                    close_code: String::from("26020b"),
                    stop_code: String::from("26020c"),
                    move_time: 4,
                },
            ],
        };

        let context = create_context(&settings, Arc::new(TcpHubConnector))
            .await
            .unwrap();
        let router = create_router(&context);

        Self {
            hub,
            context,
            router,
        }
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().uri(uri).method(method);

        let body = match body {
            Some(body) => {
                request = request.header("Content-Type", "application/json");
                Body::from(serde_json::to_string(&body).unwrap())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, value)
    }
}
