//! End-to-end scenarios: permission.asked → permission.replied → opencode.json.
//!
//! Events are fed as raw host JSON, exactly as the bridge receives them.

use ocp_permissions::{AutoAllowPlugin, ConfigFileStore, PermissionHistory};
use ocp_types::{Event, EventHandler};
use serde_json::{Value, json};
use tempfile::TempDir;

struct Project {
    plugin: AutoAllowPlugin,
    _dir: TempDir,
}

impl Project {
    fn new(initial: Option<&str>) -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("opencode.json");
        if let Some(content) = initial {
            std::fs::write(&path, content).unwrap();
        }
        let plugin = AutoAllowPlugin::new(ConfigFileStore::new(path), PermissionHistory::new());
        Self { plugin, _dir: dir }
    }

    async fn send(&self, raw: Value) {
        self.plugin.handle(&Event::from_value(&raw)).await.unwrap();
    }

    async fn ask(&self, id: &str, permission: &str, always: &[&str]) {
        self.send(json!({
            "type": "permission.asked",
            "properties": {
                "id": id,
                "sessionID": "ses_1",
                "permission": permission,
                "patterns": always,
                "always": always,
                "metadata": {}
            }
        }))
        .await;
    }

    async fn reply_always(&self, id: &str) {
        self.send(json!({
            "type": "permission.replied",
            "properties": {"sessionID": "ses_1", "requestID": id, "reply": "always"}
        }))
        .await;
    }

    fn config(&self) -> Value {
        let text = std::fs::read_to_string(self.plugin.store().path()).unwrap();
        serde_json::from_str(&text).unwrap()
    }
}

#[tokio::test]
async fn bash_command_grant_from_empty_document() {
    let project = Project::new(Some("{}"));
    project.ask("r1", "bash", &["git push"]).await;
    project.reply_always("r1").await;

    assert_eq!(
        project.config(),
        json!({
            "$schema": "https://opencode.ai/config.json",
            "permission": {"bash": {"git push": "allow"}}
        })
    );
}

#[tokio::test]
async fn wildcard_grant_becomes_blanket_allow() {
    let project = Project::new(Some("{}"));
    project.ask("r1", "bash", &["*"]).await;
    project.reply_always("r1").await;

    assert_eq!(project.config()["permission"], json!({"bash": "allow"}));
}

#[tokio::test]
async fn missing_file_is_created() {
    let project = Project::new(None);
    project.ask("r1", "webfetch", &["https://docs.rs/*"]).await;
    project.reply_always("r1").await;

    assert_eq!(
        project.config()["permission"],
        json!({"webfetch": {"https://docs.rs/*": "allow"}})
    );
}

#[tokio::test]
async fn successive_grants_accumulate_and_keep_user_settings() {
    let project = Project::new(Some(
        r#"{
  "$schema": "https://opencode.ai/config.json",
  "model": "anthropic/claude-sonnet-4-5",
  "permission": {"bash": {"ls": "allow"}, "edit": "ask"}
}"#,
    ));
    project.ask("r1", "bash", &["git status"]).await;
    project.ask("r2", "bash", &["git diff"]).await;
    project.ask("r3", "edit", &["*"]).await;
    project.reply_always("r2").await;
    project.reply_always("r1").await;
    project.reply_always("r3").await;

    assert_eq!(
        project.config(),
        json!({
            "$schema": "https://opencode.ai/config.json",
            "model": "anthropic/claude-sonnet-4-5",
            "permission": {
                "bash": {"ls": "allow", "git diff": "allow", "git status": "allow"},
                "edit": "ask"
            }
        })
    );
}

#[tokio::test]
async fn foreign_document_is_replaced_by_default() {
    let project = Project::new(Some(r#"{"permission": {"bash": "allow"}}"#));
    project.ask("r1", "read", &["*"]).await;
    project.reply_always("r1").await;

    assert_eq!(
        project.config(),
        json!({
            "$schema": "https://opencode.ai/config.json",
            "permission": {"read": "allow"}
        })
    );
}

#[tokio::test]
async fn reply_before_ask_is_ignored() {
    let project = Project::new(None);
    project.reply_always("r1").await;
    project.ask("r1", "bash", &["ls"]).await;

    assert!(!project.plugin.store().path().exists());
}

#[tokio::test]
async fn user_keys_keep_their_position_on_disk() {
    let project = Project::new(Some(
        r#"{"$schema":"https://opencode.ai/config.json","model":"m","theme":"t","permission":{"bash":{"ls":"allow"}}}"#,
    ));
    project.ask("r1", "bash", &["git push"]).await;
    project.reply_always("r1").await;

    let written = std::fs::read_to_string(project.plugin.store().path()).unwrap();
    assert_eq!(
        written,
        r#"{
  "$schema": "https://opencode.ai/config.json",
  "model": "m",
  "theme": "t",
  "permission": {
    "bash": {
      "ls": "allow",
      "git push": "allow"
    }
  }
}"#
    );

    let keys: Vec<String> = match project.config() {
        Value::Object(map) => map.keys().cloned().collect(),
        other => panic!("expected an object, got {other}"),
    };
    assert_eq!(keys, ["$schema", "model", "theme", "permission"]);
}
