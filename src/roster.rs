use crate::{
    config::RosterConfig,
    data::student::Student,
    error::{
        CsvSnafu, FetchSheetSnafu, GinghamResult, HtmlSheetSnafu, ParseSheetUrlSnafu,
        ReadSheetBodySnafu, SheetStatusSnafu,
    },
};
use jiff::Timestamp;
use reqwest::header::CONTENT_TYPE;
use snafu::{ResultExt, ensure};
use std::time::Duration;
use url::Url;

pub mod normalize;

use normalize::{NO_NAME_SENTINEL, normalize_row};

/// Fetches the configured sheet CSV and normalizes it into a roster.
///
/// With no sheet URL configured this resolves to the demo roster instead of
/// fetching. Once a URL is configured, every failure propagates; there is no
/// silent fallback to placeholder data.
pub async fn fetch_students(config: &RosterConfig) -> GinghamResult<Vec<Student>> {
    let Some(sheet_url) = config.sheet_csv_url.as_deref().filter(|url| !url.is_empty()) else {
        warn!("no sheet CSV URL configured, serving the demo roster");
        return Ok(demo_roster().await);
    };

    let url = cache_busted(sheet_url)?;
    let csv_text = fetch_csv_text(url).await?;

    students_from_csv(&csv_text, config)
}

/// Appends a `t=<unix millis>` query pair so intermediary caches can never
/// serve a stale export.
fn cache_busted(sheet_url: &str) -> GinghamResult<Url> {
    let mut url = Url::parse(sheet_url).context(ParseSheetUrlSnafu { url: sheet_url })?;
    url.query_pairs_mut()
        .append_pair("t", &Timestamp::now().as_millisecond().to_string());
    Ok(url)
}

async fn fetch_csv_text(url: Url) -> GinghamResult<String> {
    let response = reqwest::get(url).await.context(FetchSheetSnafu)?;

    let status = response.status();
    ensure!(status.is_success(), SheetStatusSnafu { status });

    // An HTML payload is a login page: the sheet isn't shared publicly.
    let got_html = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("text/html"));
    ensure!(!got_html, HtmlSheetSnafu);

    response.text().await.context(ReadSheetBodySnafu)
}

/// Parses sheet CSV text and normalizes every row, dropping rows that
/// resolve to no usable name. The first record supplies the headers; fully
/// empty lines are skipped by the reader.
pub fn students_from_csv(csv_text: &str, config: &RosterConfig) -> GinghamResult<Vec<Student>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(csv_text.as_bytes());

    let headers = reader.headers().context(CsvSnafu)?.clone();

    let mut parsed_rows = 0_usize;
    let mut students = Vec::new();

    for (index, record) in reader.records().enumerate() {
        let record = record.context(CsvSnafu)?;
        let row: Vec<(String, String)> = headers
            .iter()
            .enumerate()
            .map(|(i, header)| (header.to_string(), record.get(i).unwrap_or("").to_string()))
            .collect();

        parsed_rows += 1;
        students.push(normalize_row(
            &row,
            index,
            &config.headers,
            &config.avatar_base_url,
        ));
    }

    debug!(rows = parsed_rows, "parsed sheet CSV");

    let students: Vec<Student> = students
        .into_iter()
        .filter(|student| {
            student.full_name != NO_NAME_SENTINEL && !student.full_name.trim().is_empty()
        })
        .collect();

    if students.is_empty() && parsed_rows > 0 {
        warn!("CSV loaded but no valid students found, check the column headers");
    }

    Ok(students)
}

/// Single illustrative placeholder record, served only when no sheet URL is
/// configured. The sleep simulates fetch latency.
pub async fn demo_roster() -> Vec<Student> {
    tokio::time::sleep(Duration::from_millis(800)).await;

    vec![Student {
        id: "1".to_string(),
        full_name: "דוגמה - דניאל כהן".to_string(),
        phone_number: "050-1234567".to_string(),
        image_url: "https://ui-avatars.com/api/?name=Daniel+Cohen".to_string(),
        class: "י״ב 1".to_string(),
        notes: "זוהי דוגמה כי לא הצלחנו לטעון את הקובץ".to_string(),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GinghamError;
    use reqwest::StatusCode;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn config_with_url(url: String) -> RosterConfig {
        RosterConfig {
            sheet_csv_url: Some(url),
            ..RosterConfig::default()
        }
    }

    /// Serves exactly one canned HTTP response, then closes the connection.
    async fn one_shot_server(
        status_line: &'static str,
        content_type: &'static str,
        body: &'static str,
    ) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("unable to bind test listener");
        let addr = listener.local_addr().expect("no local addr");

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.expect("no connection");

            let mut request = Vec::new();
            let mut chunk = [0_u8; 1024];
            loop {
                let n = stream.read(&mut chunk).await.expect("read failed");
                request.extend_from_slice(&chunk[..n]);
                if n == 0 || request.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }

            let response = format!(
                "{status_line}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len(),
            );
            stream
                .write_all(response.as_bytes())
                .await
                .expect("write failed");
            stream.shutdown().await.ok();
        });

        format!("http://{addr}/sheet")
    }

    #[test]
    fn cache_buster_added_to_bare_url() {
        let url = cache_busted("https://example.org/sheet").unwrap();
        assert!(url.query_pairs().any(|(key, _)| key == "t"));
    }

    #[test]
    fn cache_buster_preserves_existing_query() {
        let url = cache_busted("https://example.org/export?format=csv").unwrap();
        let pairs: Vec<_> = url.query_pairs().map(|(k, v)| (k.to_string(), v.to_string())).collect();

        assert_eq!(pairs[0], ("format".to_string(), "csv".to_string()));
        assert_eq!(pairs[1].0, "t");
    }

    #[test]
    fn bad_url_is_a_parse_error() {
        let err = cache_busted("not a url").unwrap_err();
        assert!(matches!(err, GinghamError::ParseSheetUrl { .. }));
    }

    #[test]
    fn end_to_end_roster_from_csv_text() {
        let csv_text = "Full Name,Phone\nDana Levi,050-1234567\n,\nNo Name Row,\n";
        let students = students_from_csv(csv_text, &RosterConfig::default()).unwrap();

        assert_eq!(students.len(), 2);

        assert_eq!(students[0].id, "0501234567");
        assert_eq!(students[0].full_name, "Dana Levi");
        assert_eq!(students[0].phone_number, "050-1234567");
        assert_eq!(students[0].class, "general");

        // The comma-only row keeps index 1, so this row's positional id is 2.
        assert_eq!(students[1].id, "student-2");
        assert_eq!(students[1].full_name, "No Name Row");
        assert_eq!(
            students[1].image_url,
            "https://ui-avatars.com/api/?name=No%20Name%20Row"
        );
    }

    #[test]
    fn all_nameless_rows_yield_empty_roster() {
        let csv_text = "Full Name,Phone\n,050-1111111\n,050-2222222\n";
        let students = students_from_csv(csv_text, &RosterConfig::default()).unwrap();
        assert!(students.is_empty());
    }

    #[test]
    fn unrecognized_headers_yield_empty_roster() {
        let csv_text = "foo,bar\na,b\n";
        let students = students_from_csv(csv_text, &RosterConfig::default()).unwrap();
        assert!(students.is_empty());
    }

    #[test]
    fn duplicate_phones_share_an_id() {
        let csv_text = "Full Name,Phone\nDana,050-1234567\nNoa,0501234567\n";
        let students = students_from_csv(csv_text, &RosterConfig::default()).unwrap();

        assert_eq!(students.len(), 2);
        assert_eq!(students[0].id, students[1].id);
    }

    #[tokio::test]
    async fn fetch_resolves_roster_from_csv_response() {
        let url = one_shot_server(
            "HTTP/1.1 200 OK",
            "text/csv; charset=utf-8",
            "Full Name,Phone\nDana Levi,050-1234567\n",
        )
        .await;

        let students = fetch_students(&config_with_url(url)).await.unwrap();

        assert_eq!(students.len(), 1);
        assert_eq!(students[0].full_name, "Dana Levi");
    }

    #[tokio::test]
    async fn html_response_is_a_format_error() {
        let url = one_shot_server(
            "HTTP/1.1 200 OK",
            "text/html; charset=utf-8",
            "<html><body>Sign in</body></html>",
        )
        .await;

        let err = fetch_students(&config_with_url(url)).await.unwrap_err();
        assert!(matches!(err, GinghamError::HtmlSheet));
    }

    #[tokio::test]
    async fn non_success_status_is_a_fetch_error() {
        let url = one_shot_server("HTTP/1.1 404 Not Found", "text/plain", "gone").await;

        let err = fetch_students(&config_with_url(url)).await.unwrap_err();
        assert!(
            matches!(err, GinghamError::SheetStatus { status } if status == StatusCode::NOT_FOUND)
        );
    }

    #[tokio::test]
    async fn missing_url_serves_the_demo_roster() {
        let students = fetch_students(&RosterConfig::default()).await.unwrap();

        assert_eq!(students.len(), 1);
        assert_eq!(students[0].id, "1");
        assert_eq!(students[0].full_name, "דוגמה - דניאל כהן");
        assert!(!students[0].notes.is_empty());
    }
}
