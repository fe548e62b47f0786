use serde::Serialize;
use silvers_pipeline::PipelineClient;

#[derive(Debug, Serialize)]
struct DoctorReport {
    url: String,
    reachable: bool,
    error: Option<String>,
    tables: Vec<String>,
    missing_order_tables: Vec<String>,
    missing_order_columns: Vec<String>,
}

/// Pings the endpoint and checks the order tables and their columns.
///
/// Prints a report either way; returns an error only when a check failed so
/// scripts can rely on the exit status.
///
/// # Errors
///
/// Returns an error if the endpoint is unreachable, an order table is
/// missing or an order table lacks a column the order write needs.
pub(crate) async fn run_doctor(client: &PipelineClient) -> anyhow::Result<()> {
    let mut report = DoctorReport {
        url: client.url().to_string(),
        reachable: false,
        error: None,
        tables: Vec::new(),
        missing_order_tables: Vec::new(),
        missing_order_columns: Vec::new(),
    };

    match client.ping().await {
        Ok(()) => report.reachable = true,
        Err(e) => report.error = Some(e.to_string()),
    }

    if report.reachable {
        match client.order_tables_exist().await {
            Ok(check) => {
                report.tables = check.tables;
                report.missing_order_tables = check.missing;
                report.missing_order_columns = check.missing_columns;
            }
            Err(e) => report.error = Some(e.to_string()),
        }
    }

    crate::print_json(&report)?;

    if let Some(error) = report.error {
        anyhow::bail!("pipeline check failed: {error}");
    }
    if !report.missing_order_tables.is_empty() {
        anyhow::bail!(
            "missing order tables: {}",
            report.missing_order_tables.join(", ")
        );
    }
    if !report.missing_order_columns.is_empty() {
        anyhow::bail!(
            "order tables lack columns: {}",
            report.missing_order_columns.join(", ")
        );
    }
    Ok(())
}
