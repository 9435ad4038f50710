//! CLI smoke entry point.
//!
//! # Responsibility
//! - Open the configured forum database and run one topic lifecycle.
//! - Print counters before and after destroy for quick local sanity checks.
//!
//! Usage: `forum_cli [config.json]`. Without a config the run uses a private
//! in-memory database.

use forum_core::{
    core_version, CommentService, EmbeddedRef, ForumConfig, ForumResult, NewComment, NewNode,
    NewTopic, NewUser, NodeService, SqliteDocumentStore, TopicService, UserService,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    let config = match load_config(std::env::args().nth(1)) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("forum_cli config error: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = config.init_logging() {
        eprintln!("forum_cli logging disabled: {err}");
    }

    println!("forum_core version={}", core_version());
    match run_lifecycle(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("event=cli_run module=cli status=error error={err}");
            eprintln!("forum_cli failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<String>) -> Result<ForumConfig, String> {
    let Some(path) = path else {
        return Ok(ForumConfig::default());
    };
    let raw = std::fs::read_to_string(&path).map_err(|err| format!("{path}: {err}"))?;
    ForumConfig::from_json_str(&raw).map_err(|err| format!("{path}: {err}"))
}

fn run_lifecycle(config: &ForumConfig) -> ForumResult<()> {
    let conn = config.open_db().map_err(forum_core::StoreError::from)?;
    let store = SqliteDocumentStore::try_new(&conn)?;
    let users = UserService::with_limits(store, config.limits.clone());
    let nodes = NodeService::with_limits(store, config.limits.clone());
    let topics = TopicService::with_limits(store, config.limits.clone());
    let comments = CommentService::with_limits(store, config.limits.clone());

    let user = users.create(NewUser::new("cli-user"))?;
    let node = nodes.create(NewNode::new("cli-node"))?;
    let topic = topics.create(NewTopic::new(
        "hello from the cli",
        "<p>first post</p>",
        EmbeddedRef::from(&node.id),
        EmbeddedRef::from(&user.id),
    ))?;
    comments.create(NewComment::new(
        topic.id.as_str(),
        "first comment",
        EmbeddedRef::from(&user.id),
    ))?;
    print_counts("after_create", &users, &nodes, &user.id, &node.id)?;

    topics.destroy(&topic.id)?;
    let remaining = comments.list_for_topic(&topic.id)?.len();
    println!("topic destroyed id={} comments_remaining={remaining}", topic.id);
    print_counts("after_destroy", &users, &nodes, &user.id, &node.id)
}

fn print_counts(
    stage: &str,
    users: &UserService<SqliteDocumentStore<'_>>,
    nodes: &NodeService<SqliteDocumentStore<'_>>,
    user_id: &forum_core::DocumentId,
    node_id: &forum_core::DocumentId,
) -> ForumResult<()> {
    let user_count = users.find_by_id(user_id)?.map_or(0, |user| user.topic_count);
    let node_count = nodes.find_by_id(node_id)?.map_or(0, |node| node.topic_count);
    println!("{stage} user.topicCount={user_count} node.topicCount={node_count}");
    Ok(())
}
