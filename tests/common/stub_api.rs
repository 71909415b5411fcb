//! HTTP stand-in for the REST backend, serving the wire contract from a
//! seeded `MockBackend`.

use connectly::domain_model::*;
use connectly::infra_memory::{MockBackend, MockBackendConfig, MockBackendError};
use futures_util::TryStreamExt;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::convert::Infallible;
use std::sync::{Arc, Mutex};
use warp::http::StatusCode;
use warp::hyper::body::Buf;
use warp::multipart::FormData;
use warp::path::FullPath;
use warp::reply::{Reply, Response};
use warp::Filter;

/// One request as the stub received it.
#[derive(Debug, Clone)]
pub struct Seen {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
}

pub struct StubApi {
    pub base_url: String,
    pub backend: Arc<MockBackend>,
    seen: Arc<Mutex<Vec<Seen>>>,
    broken_profiles: Arc<Mutex<HashSet<String>>>,
}

impl StubApi {
    pub async fn start() -> Self {
        let backend = Arc::new(
            MockBackend::seeded(MockBackendConfig::default())
                .await
                .expect("seed mock backend"),
        );
        let seen = Arc::new(Mutex::new(Vec::new()));
        let broken_profiles = Arc::new(Mutex::new(HashSet::new()));

        let routes = record(seen.clone()).and(routes(backend.clone(), broken_profiles.clone()));
        let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        Self {
            base_url: format!("http://{addr}/api/"),
            backend,
            seen,
            broken_profiles,
        }
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }

    pub fn clear_seen(&self) {
        self.seen.lock().unwrap().clear();
    }

    /// Makes `GET users/{id}/` answer 500 from now on.
    pub fn break_profile(&self, id: &str) {
        self.broken_profiles.lock().unwrap().insert(id.to_string());
    }

    /// Makes `GET users/me/` answer 500 from now on.
    pub fn break_me(&self) {
        self.break_profile("me");
    }
}

fn record(
    seen: Arc<Mutex<Vec<Seen>>>,
) -> impl Filter<Extract = (), Error = warp::Rejection> + Clone {
    warp::method()
        .and(warp::path::full())
        .and(warp::header::optional::<String>("authorization"))
        .map(move |method: warp::http::Method, path: FullPath, auth: Option<String>| {
            seen.lock().unwrap().push(Seen {
                method: method.to_string(),
                path: path.as_str().to_string(),
                authorization: auth,
            });
        })
        .untuple_one()
}

fn with<T: Send + Sync + ?Sized>(
    value: Arc<T>,
) -> impl Filter<Extract = (Arc<T>,), Error = Infallible> + Clone {
    warp::any().map(move || value.clone())
}

fn bearer() -> impl Filter<Extract = (Option<AccessToken>,), Error = warp::Rejection> + Clone {
    warp::header::optional::<String>("authorization").map(|header: Option<String>| {
        header.and_then(|v| v.strip_prefix("Bearer ").map(|t| AccessToken(t.to_string())))
    })
}

fn routes(
    backend: Arc<MockBackend>,
    broken_profiles: Arc<Mutex<HashSet<String>>>,
) -> impl Filter<Extract = (Response,), Error = warp::Rejection> + Clone {
    let b = move || with(backend.clone());

    let broken = broken_profiles.clone();
    let me = warp::get()
        .and(warp::path!("api" / "users" / "me"))
        .and(bearer())
        .and(b())
        .then(move |token: Option<AccessToken>, backend: Arc<MockBackend>| {
            let broken = broken.lock().unwrap().contains("me");
            async move {
                if broken {
                    return status_reply(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        serde_json::json!({ "detail": "Server error." }),
                    );
                }
                respond(backend.current_user(token.as_ref()).await, StatusCode::OK)
            }
        });

    let login = warp::post()
        .and(warp::path!("api" / "users" / "login"))
        .and(warp::body::json())
        .and(b())
        .then(|body: LoginBody, backend: Arc<MockBackend>| async move {
            let input = LoginInput {
                mobile: body.mobile,
                password: body.password,
            };
            respond(backend.login(&input).await, StatusCode::OK)
        });

    let register = warp::post()
        .and(warp::path!("api" / "users" / "register"))
        .and(warp::body::json())
        .and(b())
        .then(|body: RegisterBody, backend: Arc<MockBackend>| async move {
            let input = RegisterInput {
                name: body.name,
                mobile: body.mobile,
                email: body.email,
                password: body.password,
            };
            respond(backend.register(&input).await, StatusCode::CREATED)
        });

    let connections = warp::get()
        .and(warp::path!("api" / "users" / "connections"))
        .and(warp::query::<HashMap<String, String>>())
        .and(bearer())
        .and(b())
        .then(
            |query: HashMap<String, String>, token: Option<AccessToken>, backend: Arc<MockBackend>| async move {
                let status = query
                    .get("status")
                    .and_then(|s| s.parse::<RequestStatus>().ok())
                    .unwrap_or_default();
                let user = query.get("user").map(|u| UserId::new(u.as_str()));
                let result = backend.connections(token.as_ref(), status, user.as_ref()).await;
                respond(
                    result.map(|c| serde_json::json!({ "count": c.len(), "connections": c })),
                    StatusCode::OK,
                )
            },
        );

    // ids only, so clients have to resolve the requesters themselves
    let pending = warp::get()
        .and(warp::path!("api" / "users" / "pending_connections"))
        .and(bearer())
        .and(b())
        .then(|token: Option<AccessToken>, backend: Arc<MockBackend>| async move {
            let result = backend.pending_connections(token.as_ref()).await.map(|list| {
                let connections: Vec<_> = list
                    .iter()
                    .map(|c| {
                        serde_json::json!({
                            "user_from": c.user_from.id,
                            "user_to": c.user_to.id,
                            "status": c.status,
                        })
                    })
                    .collect();
                serde_json::json!({ "count": connections.len(), "connections": connections })
            });
            respond(result, StatusCode::OK)
        });

    let connection_action = warp::post()
        .and(warp::path!("api" / "users" / String / String))
        .and(bearer())
        .and(b())
        .then(
            |id: String, action: String, token: Option<AccessToken>, backend: Arc<MockBackend>| async move {
                let id = UserId::new(id);
                let token = token.as_ref();
                let result = match action.as_str() {
                    "send_connection_request" => backend.send_request(token, &id).await,
                    "accept_connection_request" => backend.accept_request(token, &id).await,
                    "reject_connection_request" => backend.reject_request(token, &id).await,
                    _ => return not_found(),
                };
                respond(
                    result.map(|status| serde_json::json!({ "detail": format!("Connection request {status}.") })),
                    StatusCode::OK,
                )
            },
        );

    let mutual = warp::get()
        .and(warp::path!("api" / "users" / String / "mutual_connections"))
        .and(bearer())
        .and(b())
        .then(|id: String, token: Option<AccessToken>, backend: Arc<MockBackend>| async move {
            let token = token.as_ref();
            let result = async {
                let me = backend.current_user(token).await?;
                let mut users = backend.mutual_connections(token, &UserId::new(id)).await?;
                // some deployments echo the viewer back
                users.push(me);
                Ok::<_, MockBackendError>(users)
            }
            .await;
            respond(result, StatusCode::OK)
        });

    let user_posts = warp::get()
        .and(warp::path!("api" / "users" / String / "post"))
        .and(bearer())
        .and(b())
        .then(|id: String, token: Option<AccessToken>, backend: Arc<MockBackend>| async move {
            let result = backend.user_posts(token.as_ref(), &UserId::new(id)).await;
            respond(result, StatusCode::OK)
        });

    let broken = broken_profiles.clone();
    let profile = warp::get()
        .and(warp::path!("api" / "users" / String))
        .and(bearer())
        .and(b())
        .then(move |id: String, token: Option<AccessToken>, backend: Arc<MockBackend>| {
            let broken = broken.lock().unwrap().contains(&id);
            async move {
                if broken {
                    return status_reply(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        serde_json::json!({ "detail": "Server error." }),
                    );
                }
                respond(backend.profile(token.as_ref(), &UserId::new(id)).await, StatusCode::OK)
            }
        });

    let search = warp::get()
        .and(warp::path!("api" / "users"))
        .and(warp::query::<HashMap<String, String>>())
        .and(bearer())
        .and(b())
        .then(
            |query: HashMap<String, String>, token: Option<AccessToken>, backend: Arc<MockBackend>| async move {
                let term = query.get("search").map(String::as_str);
                respond(backend.search_users(token.as_ref(), term).await, StatusCode::OK)
            },
        );

    let list_posts = warp::get()
        .and(warp::path!("api" / "post"))
        .and(warp::query::<HashMap<String, String>>())
        .and(bearer())
        .and(b())
        .then(
            |query: HashMap<String, String>, token: Option<AccessToken>, backend: Arc<MockBackend>| async move {
                let visibility = query.get("visibility").and_then(|v| v.parse::<Visibility>().ok());
                let result = backend.list_posts(token.as_ref(), visibility).await;
                respond(
                    result.map(|p| serde_json::json!({ "count": p.len(), "posts": p })),
                    StatusCode::OK,
                )
            },
        );

    let create_post = warp::post()
        .and(warp::path!("api" / "post"))
        .and(warp::multipart::form().max_length(5 * 1024 * 1024))
        .and(bearer())
        .and(b())
        .then(|form: FormData, token: Option<AccessToken>, backend: Arc<MockBackend>| async move {
            let post = match read_post_form(form).await {
                Some(post) => post,
                None => {
                    return status_reply(
                        StatusCode::BAD_REQUEST,
                        serde_json::json!({ "detail": "Malformed form." }),
                    );
                }
            };
            respond(backend.create_post(token.as_ref(), &post).await, StatusCode::CREATED)
        });

    let like = warp::post()
        .and(warp::path!("api" / "post" / String / "like"))
        .and(bearer())
        .and(b())
        .then(|id: String, token: Option<AccessToken>, backend: Arc<MockBackend>| async move {
            respond(backend.like_post(token.as_ref(), &PostId(id)).await, StatusCode::OK)
        });

    let unlike = warp::post()
        .and(warp::path!("api" / "post" / String / "unlike"))
        .and(bearer())
        .and(b())
        .then(|id: String, token: Option<AccessToken>, backend: Arc<MockBackend>| async move {
            respond(backend.unlike_post(token.as_ref(), &PostId(id)).await, StatusCode::OK)
        });

    let comment = warp::post()
        .and(warp::path!("api" / "post" / String / "comments"))
        .and(warp::body::json())
        .and(bearer())
        .and(b())
        .then(
            |id: String, body: CommentBody, token: Option<AccessToken>, backend: Arc<MockBackend>| async move {
                let result = backend.add_comment(token.as_ref(), &PostId(id), &body.content).await;
                respond(result, StatusCode::CREATED)
            },
        );

    me.or(login)
        .unify()
        .or(register)
        .unify()
        .or(connections)
        .unify()
        .or(pending)
        .unify()
        .or(mutual)
        .unify()
        .or(user_posts)
        .unify()
        .or(connection_action)
        .unify()
        .or(profile)
        .unify()
        .or(search)
        .unify()
        .or(list_posts)
        .unify()
        .or(create_post)
        .unify()
        .or(like)
        .unify()
        .or(unlike)
        .unify()
        .or(comment)
        .unify()
        .boxed()
}

#[derive(Debug, Deserialize)]
struct LoginBody {
    mobile: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct RegisterBody {
    name: String,
    mobile: String,
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct CommentBody {
    content: String,
}

// each part's body must be drained before the next part can be read
async fn read_post_form(mut form: FormData) -> Option<NewPost> {
    let mut content = None;
    let mut visibility = Visibility::default();
    let mut image = None;

    while let Some(mut part) = form.try_next().await.ok()? {
        let name = part.name().to_string();
        let file_name = part.filename().map(str::to_string);
        let mime_type = part.content_type().map(str::to_string);
        let mut bytes = Vec::new();
        while let Some(chunk) = part.data().await {
            bytes.extend_from_slice(chunk.ok()?.chunk());
        }
        match name.as_str() {
            "content" => content = Some(String::from_utf8(bytes).ok()?),
            "visibility" => visibility = String::from_utf8(bytes).ok()?.parse().ok()?,
            "image" => {
                image = Some(ImageUpload {
                    file_name: file_name.unwrap_or_else(|| "image".to_string()),
                    mime_type: mime_type.unwrap_or_else(|| "application/octet-stream".to_string()),
                    bytes,
                })
            }
            _ => {}
        }
    }

    Some(NewPost {
        content: content?,
        visibility,
        image,
    })
}

fn respond<T: Serialize>(result: Result<T, MockBackendError>, ok: StatusCode) -> Response {
    match result {
        Ok(body) => warp::reply::with_status(warp::reply::json(&body), ok).into_response(),
        Err(MockBackendError::Unauthorized) => status_reply(
            StatusCode::UNAUTHORIZED,
            serde_json::json!({ "detail": "Authentication credentials were not provided." }),
        ),
        Err(MockBackendError::InvalidCredentials) => status_reply(
            StatusCode::UNAUTHORIZED,
            serde_json::json!({ "detail": "Invalid credentials" }),
        ),
        Err(MockBackendError::UserNotFound) | Err(MockBackendError::PostNotFound) => not_found(),
        Err(MockBackendError::Conflict(detail)) => {
            status_reply(StatusCode::BAD_REQUEST, serde_json::json!({ "detail": detail }))
        }
        Err(MockBackendError::Validation(fields)) => {
            status_reply(StatusCode::BAD_REQUEST, serde_json::to_value(fields).unwrap())
        }
        Err(MockBackendError::InternalError(e)) => status_reply(
            StatusCode::INTERNAL_SERVER_ERROR,
            serde_json::json!({ "detail": e }),
        ),
    }
}

fn not_found() -> Response {
    status_reply(StatusCode::NOT_FOUND, serde_json::json!({ "detail": "Not found." }))
}

fn status_reply(status: StatusCode, body: serde_json::Value) -> Response {
    warp::reply::with_status(warp::reply::json(&body), status).into_response()
}
