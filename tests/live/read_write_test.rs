//! Write tools against the live APIs, checked by reading back.

use serial_test::serial;

use super::harness::LiveTestHarness;

#[tokio::test]
#[serial]
async fn test_update_range_round_trip() -> anyhow::Result<()> {
    let harness = LiveTestHarness::setup().await?;
    let worksheet = harness.scratch_worksheet("round-trip", 20, 5).await?;
    let name = worksheet["name"].as_str().unwrap_or_default().to_string();

    let written = serde_json::json!([["item", "qty"], ["apples", "3"], ["pears", "5"]]);
    let update = harness
        .call_ok(
            "update_range",
            serde_json::json!({
                "spreadsheet_id": harness.spreadsheet_id,
                "worksheet_name": name,
                "range": "A1:B3",
                "values": written,
            }),
        )
        .await?;
    assert_eq!(update["updated_cells"], 6);

    let read = harness
        .call_ok(
            "read_worksheet",
            serde_json::json!({
                "spreadsheet_id": harness.spreadsheet_id,
                "worksheet_name": name,
                "range": "A1:B3",
            }),
        )
        .await?;
    // FORMATTED_VALUE renders numbers as strings, so the text round-trips exactly.
    assert_eq!(read["values"], written);

    harness.teardown().await?;
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_update_cell_and_append_twice() -> anyhow::Result<()> {
    let harness = LiveTestHarness::setup().await?;
    let worksheet = harness.scratch_worksheet("append", 20, 5).await?;
    let name = worksheet["name"].as_str().unwrap_or_default().to_string();

    let cell = harness
        .call_ok(
            "update_cell",
            serde_json::json!({
                "spreadsheet_id": harness.spreadsheet_id,
                "worksheet_name": name,
                "cell": "A1",
                "value": "header",
            }),
        )
        .await?;
    assert_eq!(cell["updated_cells"], 1);

    let row = serde_json::json!(["same", "values"]);
    let mut row_indexes = Vec::new();
    for _ in 0..2 {
        let appended = harness
            .call_ok(
                "append_row",
                serde_json::json!({
                    "spreadsheet_id": harness.spreadsheet_id,
                    "worksheet_name": name,
                    "values": row,
                }),
            )
            .await?;
        row_indexes.push(appended["row_index"].as_u64());
    }
    assert_eq!(row_indexes, vec![Some(2), Some(3)]);

    let read = harness
        .call_ok(
            "read_worksheet",
            serde_json::json!({
                "spreadsheet_id": harness.spreadsheet_id,
                "worksheet_name": name,
            }),
        )
        .await?;
    let rows = read["values"].as_array().cloned().unwrap_or_default();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1], rows[2]);

    harness.teardown().await?;
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_invalid_range_never_reaches_google() -> anyhow::Result<()> {
    let harness = LiveTestHarness::setup().await?;

    let envelope = harness
        .call_tool(
            "update_range",
            serde_json::json!({
                "spreadsheet_id": harness.spreadsheet_id,
                "worksheet_name": "Sheet1",
                "range": "not a range",
                "values": [["x"]],
            }),
        )
        .await?;
    assert_eq!(envelope["status"], "error");
    assert_eq!(envelope["error"], "invalid_argument");

    harness.teardown().await?;
    Ok(())
}
