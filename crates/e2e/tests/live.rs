use std::path::PathBuf;
use std::process::Command;
use std::sync::Arc;

use ngx_pilot_driver::{DriverError, Page, PlaywrightConfig, PlaywrightPage};
use ngx_pilot_e2e::{PageManager, PilotConfig, Section};

fn in_path(bin: &str) -> bool {
    Command::new("sh")
        .arg("-lc")
        .arg(format!("command -v {bin} >/dev/null 2>&1"))
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Live Browser Smoke Test
///
/// Drives a real ngx-admin instance through Playwright: visits every
/// sidebar section, then picks a date and a range.
///
/// Marked ignored because it needs Node.js, the `playwright` package and a
/// running app at `NGX_PILOT_BASE_URL` (default `http://127.0.0.1:4200`).
#[tokio::test]
#[ignore]
async fn live_sections_and_datepickers() {
    if !in_path("node") || !in_path("npx") {
        eprintln!("Skipping: node/npx not available in PATH");
        return;
    }

    ngx_pilot_e2e::logging::init();

    let mut config = PlaywrightConfig::default();
    if let Ok(url) = std::env::var("NGX_PILOT_BASE_URL") {
        config.base_url = url;
    }
    if let Ok(dir) = std::env::var("NGX_PILOT_NODE_PROJECT") {
        config.node_project_dir = PathBuf::from(dir);
    }

    let browser = match PlaywrightPage::launch(config).await {
        Ok(browser) => Arc::new(browser),
        Err(DriverError::PlaywrightNotFound) => {
            eprintln!("Skipping: playwright is not installed");
            return;
        }
        Err(e) => panic!("failed to launch playwright: {e}"),
    };
    let page: Arc<dyn Page> = browser.clone();
    let pm = PageManager::new(page, PilotConfig::default());

    for section in Section::ALL {
        let report = pm.navigate_to().go_to(section).await.unwrap();
        println!("{} -> {} ({:?})", section, report.url, report.expand);
    }

    pm.navigate_to().datepicker_page().await.unwrap();
    let single = pm.on_datepicker_page().select_date(10).await.unwrap();
    let range = pm.on_datepicker_page().select_date_range(3, 40).await.unwrap();
    println!("picked {single} and {range}");

    browser.close().await.unwrap();
}
