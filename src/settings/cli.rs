use super::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "connectly", about = "Client for the Connectly social network")]
pub struct Cli {
    /// Path to a settings file; defaults to settings/dev.toml.
    #[arg(long, global = true)]
    pub settings: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Exchange mobile and password for a session.
    Login {
        #[arg(long)]
        mobile: String,
        #[arg(long)]
        password: String,
    },
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        mobile: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    /// Show the signed-in user.
    Whoami,
    Profile {
        user: String,
    },
    /// Search users by name, email or mobile.
    Search {
        term: Option<String>,
    },
    /// Send a connection request.
    Connect {
        user: String,
    },
    Accept {
        user: String,
    },
    Reject {
        user: String,
    },
    Connections {
        #[arg(long, default_value = "accepted")]
        status: String,
        #[arg(long)]
        user: Option<String>,
    },
    /// Inbound requests awaiting an answer.
    Pending,
    Mutual {
        user: String,
    },
    SearchConnections {
        term: String,
        #[arg(long, default_value = "accepted")]
        status: String,
    },
    Posts {
        #[arg(long)]
        visibility: Option<String>,
    },
    UserPosts {
        user: String,
    },
    Post {
        content: String,
        #[arg(long, default_value = "public")]
        visibility: String,
        /// Image file to attach.
        #[arg(long)]
        image: Option<String>,
    },
    Like {
        post: String,
    },
    Unlike {
        post: String,
    },
    Comment {
        post: String,
        content: String,
    },
}
