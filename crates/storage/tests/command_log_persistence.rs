use storage::Storage;

#[tokio::test]
async fn commands_survive_reopening_the_database() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("homepage.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    {
        let storage = Storage::new(&database_url).await.expect("open");
        storage.store_command("calculator").await.expect("store");
        storage.store_command("redirectToReddit").await.expect("store");
        storage.pool().close().await;
    }

    let reopened = Storage::new(&database_url).await.expect("reopen");
    let commands = reopened.list_commands().await.expect("list");
    assert_eq!(commands.len(), 2);
    assert_eq!(commands[0].command, "calculator");
    assert_eq!(commands[1].command, "redirectToReddit");
}
