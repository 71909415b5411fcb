use connectly::application_port::*;
use connectly::client::Client;
use connectly::domain_model::*;
use connectly::logger::*;
use connectly::settings::*;
use serde::Serialize;
use std::path::Path;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logger = Logger::new_bootstrap();

    let project_settings = parse_settings(cli.settings.as_deref())?;
    debug!(?project_settings);
    let logger_config = LogConfig {
        filter: project_settings.log.filter.clone(),
    };
    logger.reload_from_config(&logger_config)?;

    let client = Client::try_new(&project_settings).await?;

    match run(&client, cli.command).await {
        Ok(()) => Ok(()),
        Err(failure) => {
            print_json(&failure)?;
            std::process::exit(1);
        }
    }
}

/// Error shape printed on stdout when a command fails.
#[derive(Debug, Serialize)]
struct Failure {
    kind: ErrorKind,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<FieldErrors>,
}

impl Failure {
    fn new(kind: ErrorKind, err: impl std::fmt::Display) -> Self {
        Self {
            kind,
            message: err.to_string(),
            fields: None,
        }
    }

    fn usage(err: impl std::fmt::Display) -> Self {
        Self::new(ErrorKind::Validation, err)
    }
}

macro_rules! fail {
    ($e:expr) => {{
        let e = $e;
        Failure::new(e.kind(), &e)
    }};
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse<T: std::str::FromStr>(raw: &str) -> Result<T, Failure>
where
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(Failure::usage)
}

async fn run(client: &Client, command: Command) -> Result<(), Failure> {
    let out = match command {
        Command::Login { mobile, password } => {
            let user = client
                .auth_service
                .login(LoginInput { mobile, password })
                .await
                .map_err(|e| fail!(e))?;
            serde_json::to_value(user)
        }
        Command::Register {
            name,
            mobile,
            email,
            password,
        } => {
            let input = RegisterInput {
                name,
                mobile,
                email,
                password,
            };
            let user = client.auth_service.register(input).await.map_err(|e| {
                let mut failure = Failure::new(e.kind(), &e);
                failure.fields = e.field_errors().cloned();
                failure
            })?;
            serde_json::to_value(user)
        }
        Command::Logout => {
            client.auth_service.logout().await;
            Ok(serde_json::json!({ "logged_out": true }))
        }
        Command::Whoami => {
            let user = client
                .auth_service
                .current_user()
                .await
                .map_err(|e| fail!(e))?;
            serde_json::to_value(user)
        }
        Command::Profile { user } => {
            let user: UserId = parse(&user)?;
            let profile = client
                .profile_service
                .get_profile(&user)
                .await
                .map_err(|e| fail!(e))?;
            serde_json::to_value(profile)
        }
        Command::Search { term } => {
            let users = client
                .profile_service
                .search_users(term.as_deref())
                .await
                .map_err(|e| fail!(e))?;
            serde_json::to_value(users)
        }
        Command::Connect { user } => {
            let user: UserId = parse(&user)?;
            let status = client
                .connection_service
                .send_request(&user)
                .await
                .map_err(|e| fail!(e))?;
            Ok(serde_json::json!({ "user": user, "status": status }))
        }
        Command::Accept { user } => {
            let user: UserId = parse(&user)?;
            let status = client
                .connection_service
                .accept_request(&user)
                .await
                .map_err(|e| fail!(e))?;
            Ok(serde_json::json!({ "user": user, "status": status }))
        }
        Command::Reject { user } => {
            let user: UserId = parse(&user)?;
            let status = client
                .connection_service
                .reject_request(&user)
                .await
                .map_err(|e| fail!(e))?;
            Ok(serde_json::json!({ "user": user, "status": status }))
        }
        Command::Connections { status, user } => {
            let status: RequestStatus = parse(&status)?;
            let user = user.as_deref().map(parse::<UserId>).transpose()?;
            let connections = client
                .connection_service
                .connections(status, user.as_ref())
                .await
                .map_err(|e| fail!(e))?;
            serde_json::to_value(connections)
        }
        Command::Pending => {
            let connections = client
                .connection_service
                .pending_connections()
                .await
                .map_err(|e| fail!(e))?;
            serde_json::to_value(connections)
        }
        Command::Mutual { user } => {
            let user: UserId = parse(&user)?;
            let users = client
                .connection_service
                .mutual_connections(&user)
                .await
                .map_err(|e| fail!(e))?;
            serde_json::to_value(users)
        }
        Command::SearchConnections { term, status } => {
            let status: RequestStatus = parse(&status)?;
            let connections = client
                .connection_service
                .search_connections(&term, status)
                .await
                .map_err(|e| fail!(e))?;
            serde_json::to_value(connections)
        }
        Command::Posts { visibility } => {
            let visibility = visibility.as_deref().map(parse::<Visibility>).transpose()?;
            let posts = client
                .post_service
                .list_posts(visibility)
                .await
                .map_err(|e| fail!(e))?;
            serde_json::to_value(posts)
        }
        Command::UserPosts { user } => {
            let user: UserId = parse(&user)?;
            let posts = client
                .post_service
                .user_posts(&user)
                .await
                .map_err(|e| fail!(e))?;
            serde_json::to_value(posts)
        }
        Command::Post {
            content,
            visibility,
            image,
        } => {
            let image = match image {
                Some(path) => Some(read_image(Path::new(&path)).await?),
                None => None,
            };
            let post = NewPost {
                content,
                visibility: parse(&visibility)?,
                image,
            };
            let post = client
                .post_service
                .create_post(post)
                .await
                .map_err(|e| fail!(e))?;
            serde_json::to_value(post)
        }
        Command::Like { post } => {
            let post: PostId = parse(&post)?;
            let post = client
                .post_service
                .like_post(&post)
                .await
                .map_err(|e| fail!(e))?;
            serde_json::to_value(post)
        }
        Command::Unlike { post } => {
            let post: PostId = parse(&post)?;
            let post = client
                .post_service
                .unlike_post(&post)
                .await
                .map_err(|e| fail!(e))?;
            serde_json::to_value(post)
        }
        Command::Comment { post, content } => {
            let post: PostId = parse(&post)?;
            let comment = client
                .post_service
                .add_comment(&post, &content)
                .await
                .map_err(|e| fail!(e))?;
            serde_json::to_value(comment)
        }
    };

    let out = out.map_err(|e| Failure::new(ErrorKind::Internal, e))?;
    print_json(&out).map_err(|e| Failure::new(ErrorKind::Internal, e))
}

async fn read_image(path: &Path) -> Result<ImageUpload, Failure> {
    let bytes = tokio::fs::read(path).await.map_err(Failure::usage)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let mime_type = match path.extension().and_then(|e| e.to_str()) {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    };
    Ok(ImageUpload {
        file_name,
        mime_type: mime_type.to_string(),
        bytes,
    })
}
