//! CSV file export

use std::path::Path;

use crate::error::AppResult;

/// Write rows to a CSV file with a literal header row.
///
/// Quoting follows RFC 4180: fields containing a comma or double quote are
/// wrapped in double quotes with internal quotes doubled.
pub fn write_csv<P, I>(path: P, header: &[&str], rows: I) -> AppResult<()>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = Vec<String>>,
{
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_with_commas_and_quotes_are_escaped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");

        write_csv(
            &path,
            &["MemberID", "Name", "TotalFine"],
            vec![
                vec!["1".to_string(), "Doe, Jane".to_string(), "3.00".to_string()],
                vec!["2".to_string(), "J \"Bill\" Smith".to_string(), "0.00".to_string()],
            ],
        )
        .unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next(), Some("MemberID,Name,TotalFine"));
        assert_eq!(lines.next(), Some("1,\"Doe, Jane\",3.00"));
        assert_eq!(lines.next(), Some("2,\"J \"\"Bill\"\" Smith\",0.00"));
    }

    #[test]
    fn plain_fields_stay_unquoted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.csv");

        write_csv(
            &path,
            &["BookID", "Title", "IssueCount"],
            vec![vec!["7".to_string(), "Dune".to_string(), "4".to_string()]],
        )
        .unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "BookID,Title,IssueCount\n7,Dune,4\n");
    }
}
