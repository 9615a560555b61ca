//! Daily CSV snapshot of the membership table.

use anyhow::Result;
use chrono::NaiveDate;
use sqlx::PgConnection;
use std::path::Path;

use crate::domains::member::Member;
use crate::kernel::Settings;

const HEADER: &str =
    "id,first_name,last_name,membership,paid_date,access,pay_subs,pay_source,pay_next,charged,modified";

fn csv_escape(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn member_row(m: &Member) -> String {
    let cells: Vec<String> = vec![
        m.id.to_string(),
        csv_escape(&m.first_name),
        csv_escape(&m.last_name),
        csv_escape(m.membership.as_deref().unwrap_or_default()),
        m.paid_date.map(|d| d.to_string()).unwrap_or_default(),
        csv_escape(m.access.as_deref().unwrap_or_default()),
        csv_escape(m.pay_subs.as_deref().unwrap_or_default()),
        csv_escape(m.pay_source.as_deref().unwrap_or_default()),
        m.pay_next.map(|d| d.to_string()).unwrap_or_default(),
        m.charged.map(|c| c.to_string()).unwrap_or_default(),
        m.modified.map(|t| t.to_string()).unwrap_or_default(),
    ];
    cells.join(",")
}

/// Write the full membership dump to
/// `<org-short-name>_backup_<YYYYMMDD>.csv` in the backup directory.
///
/// Reads on the run's transaction so the snapshot includes this run's
/// pending mutations.
pub async fn write_snapshot(
    conn: &mut PgConnection,
    settings: &Settings,
    today: NaiveDate,
) -> Result<()> {
    let members = Member::fetch_all_ordered(conn).await?;

    let mut out = String::from(HEADER);
    out.push('\n');
    for member in &members {
        out.push_str(&member_row(member));
        out.push('\n');
    }

    let file_name = format!(
        "{}_backup_{}.csv",
        settings.org_short_name,
        today.format("%Y%m%d")
    );
    let path = Path::new(&settings.backup_dir).join(file_name);
    tokio::fs::write(&path, out).await?;

    tracing::info!(
        "membership snapshot written ({} members) to {}",
        members.len(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_escape_quotes_only_when_needed() {
        assert_eq!(csv_escape("plain"), "plain");
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn member_row_matches_header_arity() {
        let m = Member {
            id: 1,
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            membership: Some("Full".to_string()),
            paid_date: NaiveDate::from_ymd_opt(2026, 3, 1),
            access: Some("admin".to_string()),
            pay_subs: None,
            pay_source: None,
            pay_next: None,
            charged: None,
            modified: None,
        };
        assert_eq!(member_row(&m).split(',').count(), HEADER.split(',').count());
    }
}
