//! Discovery tools against the live APIs: list, open by URL and title, worksheets.

use serial_test::serial;

use super::harness::LiveTestHarness;

#[tokio::test]
#[serial]
async fn test_list_spreadsheets_includes_live_sheet() -> anyhow::Result<()> {
    let harness = LiveTestHarness::setup().await?;

    let listed = harness
        .call_ok("list_spreadsheets", serde_json::json!({}))
        .await?;
    let ids: Vec<&str> = listed
        .as_array()
        .expect("list_spreadsheets returns an array")
        .iter()
        .filter_map(|s| s["id"].as_str())
        .collect();
    assert!(
        ids.contains(&harness.spreadsheet_id.as_str()),
        "live spreadsheet should be visible to the service account: {ids:?}"
    );

    harness.teardown().await?;
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_open_by_url_and_title_agree() -> anyhow::Result<()> {
    let harness = LiveTestHarness::setup().await?;

    let url = format!(
        "https://docs.google.com/spreadsheets/d/{}/edit#gid=0",
        harness.spreadsheet_id
    );
    let by_url = harness
        .call_ok("open_spreadsheet", serde_json::json!({ "identifier": url }))
        .await?;
    assert_eq!(by_url["id"], harness.spreadsheet_id.as_str());
    assert!(by_url["sheet_count"].as_u64().unwrap_or(0) >= 1);

    let title = by_url["title"].as_str().unwrap_or_default().to_string();
    let by_title = harness
        .call_ok("open_spreadsheet", serde_json::json!({ "identifier": title }))
        .await?;
    assert_eq!(by_title["id"], by_url["id"]);

    harness.teardown().await?;
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_missing_spreadsheet_is_not_found() -> anyhow::Result<()> {
    let harness = LiveTestHarness::setup().await?;

    let envelope = harness
        .call_tool(
            "list_worksheets",
            serde_json::json!({ "spreadsheet_id": "this-spreadsheet-does-not-exist" }),
        )
        .await?;
    assert_eq!(envelope["status"], "error");
    assert_eq!(envelope["error"], "not_found", "{envelope}");

    harness.teardown().await?;
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_create_worksheet_reports_dimensions() -> anyhow::Result<()> {
    let harness = LiveTestHarness::setup().await?;

    let worksheet = harness.scratch_worksheet("dims", 10, 5).await?;
    assert_eq!(worksheet["row_count"], 10);
    assert_eq!(worksheet["col_count"], 5);

    let listed = harness
        .call_ok(
            "list_worksheets",
            serde_json::json!({ "spreadsheet_id": harness.spreadsheet_id }),
        )
        .await?;
    let names: Vec<&str> = listed
        .as_array()
        .expect("list_worksheets returns an array")
        .iter()
        .filter_map(|ws| ws["name"].as_str())
        .collect();
    assert!(names.contains(&worksheet["name"].as_str().unwrap_or_default()));

    harness.teardown().await?;
    Ok(())
}
