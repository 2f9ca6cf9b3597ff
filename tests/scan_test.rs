use i18n_audit::config::descriptor_by_id;
use i18n_audit::scan::LengthBucket;
use i18n_audit::{run_scan, AuditConfig, ReportStatus, ScanQuery, Scanner};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn dashboard() -> String {
    format!(
        "export function Dashboard() {{\n  return (\n    <div>\n      <h1>Welcome to Dashboard</h1>\n      <span>Ok</span>\n      <p>{}</p>\n    </div>\n  );\n}}\n",
        "Lorem ipsum dolor sit amet ".repeat(8).trim_end()
    )
}

#[test]
fn test_length_bounds() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "src/Dashboard.jsx", &dashboard());

    let config = AuditConfig::default().with_length_bounds(3, 80);
    let result = run_scan(
        ScanQuery::new(dir.path())
            .with_config(config)
            .with_framework("react"),
    )
    .unwrap();

    let texts: Vec<&str> = result.literals().map(|o| o.text.as_str()).collect();
    assert_eq!(texts, vec!["Welcome to Dashboard"]);

    let welcome = &result.occurrences[0];
    assert_eq!(welcome.file, Path::new("src/Dashboard.jsx"));
    assert_eq!(welcome.line, 4);
    assert_eq!(welcome.column, 11);
    assert_eq!(welcome.bucket, LengthBucket::Usable);
    assert_eq!(result.framework, "react");
    assert_eq!(result.files_scanned, 1);
    assert_eq!(result.status, ReportStatus::IssuesFound);
}

#[test]
fn test_wider_bounds_admit_long_text() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "src/Dashboard.jsx", &dashboard());

    let config = AuditConfig::default().with_length_bounds(2, 300);
    let result = run_scan(
        ScanQuery::new(dir.path())
            .with_config(config)
            .with_framework("react"),
    )
    .unwrap();

    assert_eq!(result.literals().count(), 3);
}

#[test]
fn test_key_calls_are_kept_and_locales_are_not_scanned() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "src/App.jsx",
        "const title = t('nav.home');\nconst x = i18n.t(\"errors.notFound\");\n",
    );
    write(
        dir.path(),
        "src/locales/en/common.js",
        "export default { home: 'Home page title' };\n",
    );

    let result = run_scan(ScanQuery::new(dir.path()).with_framework("react")).unwrap();

    let keys: Vec<&str> = result.key_calls().map(|o| o.text.as_str()).collect();
    assert_eq!(keys, vec!["nav.home", "errors.notFound"]);
    assert!(result
        .occurrences
        .iter()
        .all(|o| !o.file.starts_with("src/locales")));
}

#[test]
fn test_tests_are_skipped_unless_requested() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "src/App.test.jsx", "<p>Hello from a test</p>\n");
    write(dir.path(), "src/__tests__/Nav.jsx", "<p>Hello from a test dir</p>\n");

    // Nothing left to scan is not a clean project
    let result = run_scan(ScanQuery::new(dir.path()).with_framework("react")).unwrap();
    assert_eq!(result.occurrences.len(), 0);
    assert_eq!(result.status, ReportStatus::Aborted);

    let config = AuditConfig::default().with_include_tests(true);
    let result = run_scan(
        ScanQuery::new(dir.path())
            .with_config(config)
            .with_framework("react"),
    )
    .unwrap();
    assert_eq!(result.occurrences.len(), 2);
    assert_eq!(result.status, ReportStatus::IssuesFound);
}

#[test]
fn test_python_gettext() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "app/views.py",
        "from flask_babel import gettext as _\n\ndef index():\n    flash(_(\"Welcome back\"))\n    return render(\"Profile settings saved\")\n",
    );

    let result = run_scan(ScanQuery::new(dir.path()).with_framework("flask")).unwrap();

    let keys: Vec<&str> = result.key_calls().map(|o| o.text.as_str()).collect();
    assert_eq!(keys, vec!["Welcome back"]);
    assert!(result
        .literals()
        .any(|o| o.text == "Profile settings saved"));
}

#[test]
fn test_iterator_and_parallel_agree() {
    let dir = TempDir::new().unwrap();
    for i in 0..12 {
        write(
            dir.path(),
            &format!("src/page{:02}.jsx", i),
            &format!(
                "<h1>Page number {}</h1>\n<button title=\"Go to next page\">Next</button>\n",
                i
            ),
        );
    }

    let descriptor = descriptor_by_id("react").unwrap();
    let config = AuditConfig::default().with_concurrency(3);
    let scanner = Scanner::new(dir.path(), descriptor, &config).unwrap();

    let streamed: Vec<_> = scanner.iter().collect();
    let parallel = scanner.scan_parallel().unwrap();
    assert_eq!(streamed, parallel.occurrences);
    assert_eq!(parallel.files_scanned, 12);
    assert_eq!(streamed.len(), 36);
}
