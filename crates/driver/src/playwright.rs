//! Playwright browser automation
//!
//! [`PlaywrightPage`] keeps one Node.js process alive for the lifetime of the
//! page. The process runs a small bridge script that owns a Playwright
//! `Page` and executes one JSON command per stdin line, answering with one
//! JSON line on stdout. Locators travel as structured segment lists and are
//! rebuilt with Playwright's own locator API on the Node side.

use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command as TokioCommand};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{DriverError, DriverResult};
use crate::locator::{Locator, Nth, Selector, TextMatch};
use crate::page::{ClickOptions, Page, WaitState};

#[derive(Debug, Clone, Copy, Default)]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

/// Configuration for Playwright
#[derive(Debug, Clone)]
pub struct PlaywrightConfig {
    pub base_url: String,
    pub browser: Browser,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Default Playwright timeout for actions such as `click` and `fill`
    pub action_timeout: Duration,
    /// Upper bound on a single bridge round trip, on top of Playwright's own
    /// timeouts
    pub command_timeout: Duration,
    /// Directory whose `node_modules` provides the `playwright` package
    pub node_project_dir: PathBuf,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:4200".to_string(),
            browser: Browser::Chromium,
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            action_timeout: Duration::from_secs(10),
            command_timeout: Duration::from_secs(60),
            node_project_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Reply {
    id: u64,
    ok: bool,
    #[serde(default)]
    value: Value,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    timeout: bool,
}

struct Channel {
    stdin: ChildStdin,
    lines: Lines<BufReader<ChildStdout>>,
    next_id: u64,
}

/// Playwright-backed browser page
pub struct PlaywrightPage {
    channel: Mutex<Channel>,
    action_timeout: Duration,
    command_timeout: Duration,
    _child: Child,
    // Holds bridge.js until the process exits
    _script_dir: tempfile::TempDir,
}

impl PlaywrightPage {
    /// Launch a browser and open a fresh page
    pub async fn launch(config: PlaywrightConfig) -> DriverResult<Self> {
        Self::check_playwright_installed(&config)?;

        let script_dir = tempfile::tempdir()?;
        let script_path = script_dir.path().join("bridge.js");
        std::fs::write(&script_path, BRIDGE_SCRIPT)?;

        debug!("Starting Playwright bridge: {}", script_path.display());

        let mut child = TokioCommand::new("node")
            .arg(&script_path)
            .current_dir(&config.node_project_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| DriverError::Bridge("bridge stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| DriverError::Bridge("bridge stdout unavailable".to_string()))?;

        let page = Self {
            channel: Mutex::new(Channel {
                stdin,
                lines: BufReader::new(stdout).lines(),
                next_id: 0,
            }),
            action_timeout: config.action_timeout,
            command_timeout: config.command_timeout,
            _child: child,
            _script_dir: script_dir,
        };

        page.call(json!({
            "op": "launch",
            "browser": config.browser.as_str(),
            "headless": config.headless,
            "baseUrl": config.base_url,
            "viewport": { "width": config.viewport_width, "height": config.viewport_height },
            "actionTimeout": config.action_timeout.as_millis() as u64,
        }))
        .await?;

        info!(
            "Playwright {} page ready (base URL {})",
            config.browser.as_str(),
            config.base_url
        );
        Ok(page)
    }

    /// Check if Playwright is installed
    fn check_playwright_installed(config: &PlaywrightConfig) -> DriverResult<()> {
        let output = Command::new("npx")
            .args(["playwright", "--version"])
            .current_dir(&config.node_project_dir)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match output {
            Ok(status) if status.success() => Ok(()),
            _ => Err(DriverError::PlaywrightNotFound),
        }
    }

    /// Close the browser; the bridge process exits afterwards
    pub async fn close(&self) -> DriverResult<()> {
        self.call(json!({ "op": "close" })).await.map(|_| ())
    }

    async fn call(&self, mut command: Value) -> DriverResult<Value> {
        let mut channel = self.channel.lock().await;
        channel.next_id += 1;
        let id = channel.next_id;
        command["id"] = json!(id);

        let mut line = serde_json::to_string(&command)?;
        line.push('\n');
        channel.stdin.write_all(line.as_bytes()).await?;
        channel.stdin.flush().await?;

        let reply = tokio::time::timeout(self.command_timeout, async {
            loop {
                let Some(raw) = channel.lines.next_line().await? else {
                    return Err(DriverError::BridgeClosed);
                };
                match serde_json::from_str::<Reply>(&raw) {
                    Ok(reply) if reply.id == id => return Ok(reply),
                    Ok(reply) => warn!("Dropping stale bridge reply {}", reply.id),
                    // Anything else on stdout is console noise from the page
                    Err(_) => debug!("[bridge] {}", raw),
                }
            }
        })
        .await
        .map_err(|_| DriverError::Timeout {
            what: format!("bridge reply to {}", command["op"]),
            timeout_ms: self.command_timeout.as_millis() as u64,
        })??;

        reply_result(reply, &command, self.action_timeout)
    }

    async fn call_on(&self, op: &str, locator: &Locator, extra: Value) -> DriverResult<Value> {
        let mut command = json!({ "op": op, "locator": locator_json(locator) });
        if let (Value::Object(target), Value::Object(fields)) = (&mut command, extra) {
            target.extend(fields);
        }
        self.call(command).await
    }
}

/// Turn a bridge reply into a result. Playwright timeouts on commands without
/// an explicit `timeout` ran under the context's default action timeout.
fn reply_result(reply: Reply, command: &Value, action_timeout: Duration) -> DriverResult<Value> {
    if reply.ok {
        Ok(reply.value)
    } else if reply.timeout {
        Err(DriverError::Timeout {
            what: reply.error.unwrap_or_else(|| command["op"].to_string()),
            timeout_ms: command["timeout"]
                .as_u64()
                .unwrap_or(action_timeout.as_millis() as u64),
        })
    } else {
        Err(DriverError::Bridge(
            reply.error.unwrap_or_else(|| "unknown bridge error".to_string()),
        ))
    }
}

#[async_trait]
impl Page for PlaywrightPage {
    async fn goto(&self, url: &str) -> DriverResult<()> {
        self.call(json!({ "op": "goto", "url": url })).await.map(|_| ())
    }

    async fn url(&self) -> DriverResult<String> {
        let value = self.call(json!({ "op": "url" })).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn count(&self, locator: &Locator) -> DriverResult<usize> {
        let value = self.call_on("count", locator, json!({})).await?;
        Ok(value.as_u64().unwrap_or_default() as usize)
    }

    async fn is_visible(&self, locator: &Locator) -> DriverResult<bool> {
        let value = self.call_on("isVisible", locator, json!({})).await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn wait_for(
        &self,
        locator: &Locator,
        state: WaitState,
        timeout: Duration,
    ) -> DriverResult<()> {
        self.call_on(
            "waitFor",
            locator,
            json!({ "state": state.as_str(), "timeout": timeout.as_millis() as u64 }),
        )
        .await
        .map(|_| ())
    }

    async fn click(&self, locator: &Locator, options: ClickOptions) -> DriverResult<()> {
        self.call_on("click", locator, json!({ "force": options.force }))
            .await
            .map(|_| ())
    }

    async fn fill(&self, locator: &Locator, value: &str) -> DriverResult<()> {
        self.call_on("fill", locator, json!({ "value": value }))
            .await
            .map(|_| ())
    }

    async fn set_checked(
        &self,
        locator: &Locator,
        checked: bool,
        options: ClickOptions,
    ) -> DriverResult<()> {
        self.call_on(
            "setChecked",
            locator,
            json!({ "checked": checked, "force": options.force }),
        )
        .await
        .map(|_| ())
    }

    async fn text_content(&self, locator: &Locator) -> DriverResult<Option<String>> {
        let value = self.call_on("textContent", locator, json!({})).await?;
        Ok(value.as_str().map(str::to_string))
    }

    async fn get_attribute(&self, locator: &Locator, name: &str) -> DriverResult<Option<String>> {
        let value = self
            .call_on("getAttribute", locator, json!({ "name": name }))
            .await?;
        Ok(value.as_str().map(str::to_string))
    }

    async fn input_value(&self, locator: &Locator) -> DriverResult<String> {
        let value = self.call_on("inputValue", locator, json!({})).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn scroll_into_view(&self, locator: &Locator) -> DriverResult<()> {
        self.call_on("scrollIntoView", locator, json!({}))
            .await
            .map(|_| ())
    }

    async fn mouse_move(&self, x: f64, y: f64) -> DriverResult<()> {
        self.call(json!({ "op": "mouseMove", "x": x, "y": y }))
            .await
            .map(|_| ())
    }

    async fn mouse_down(&self) -> DriverResult<()> {
        self.call(json!({ "op": "mouseDown" })).await.map(|_| ())
    }

    async fn mouse_up(&self) -> DriverResult<()> {
        self.call(json!({ "op": "mouseUp" })).await.map(|_| ())
    }
}

/// Wire form of a locator understood by the bridge's `build()`
pub fn locator_json(locator: &Locator) -> Value {
    let segments: Vec<Value> = locator
        .segments()
        .iter()
        .map(|segment| {
            let selector = match &segment.selector {
                Selector::Css(css) => json!({ "kind": "css", "value": css }),
                Selector::Role { role, name } => json!({
                    "kind": "role",
                    "role": role.as_str(),
                    "name": name.as_ref().map(text_json),
                }),
                Selector::Text(text) => json!({ "kind": "text", "text": text_json(text) }),
                Selector::Placeholder(value) => json!({ "kind": "placeholder", "value": value }),
            };
            let nth = match segment.nth {
                Some(Nth::First) => json!(0),
                Some(Nth::Last) => json!(-1),
                Some(Nth::Index(i)) => json!(i),
                None => Value::Null,
            };
            json!({
                "selector": selector,
                "hasText": segment.has_text.as_ref().map(text_json),
                "selfTag": segment.self_tag,
                "nth": nth,
            })
        })
        .collect();
    Value::Array(segments)
}

fn text_json(text: &TextMatch) -> Value {
    match text {
        TextMatch::Exact(value) => json!({ "kind": "exact", "value": value }),
        TextMatch::ExactIgnoreCase(value) => json!({ "kind": "exactIgnoreCase", "value": value }),
        TextMatch::Contains(value) => json!({ "kind": "contains", "value": value }),
        TextMatch::Pattern {
            source,
            ignore_case,
            ..
        } => json!({ "kind": "pattern", "source": source, "ignoreCase": ignore_case }),
    }
}

const BRIDGE_SCRIPT: &str = r#"
const readline = require('readline');
const playwright = require('playwright');

let browser;
let page;

const escapeRe = (s) => s.replace(/[.*+?^${}()|[\]\\]/g, '\\$&');

function matcher(t, forFilter) {
  switch (t.kind) {
    case 'exact':
      return forFilter ? new RegExp('^\\s*' + escapeRe(t.value) + '\\s*$') : t.value;
    case 'exactIgnoreCase':
      return new RegExp('^\\s*' + escapeRe(t.value) + '\\s*$', 'i');
    case 'contains':
      return t.value;
    case 'pattern':
      return new RegExp(t.source, t.ignoreCase ? 'i' : '');
  }
  throw new Error('unknown text matcher ' + t.kind);
}

function build(segments) {
  let loc = page;
  for (const seg of segments) {
    const s = seg.selector;
    switch (s.kind) {
      case 'css':
        loc = loc.locator(s.value);
        break;
      case 'role':
        loc = s.name
          ? loc.getByRole(s.role, { name: matcher(s.name, false), exact: s.name.kind === 'exact' })
          : loc.getByRole(s.role);
        break;
      case 'text':
        loc = loc.getByText(matcher(s.text, false), { exact: s.text.kind === 'exact' });
        break;
      case 'placeholder':
        loc = loc.getByPlaceholder(s.value);
        break;
    }
    if (seg.hasText) loc = loc.filter({ hasText: matcher(seg.hasText, true) });
    if (seg.selfTag) loc = loc.locator('xpath=self::' + seg.selfTag);
    if (seg.nth === -1) loc = loc.last();
    else if (seg.nth !== null && seg.nth !== undefined) loc = loc.nth(seg.nth);
  }
  return loc;
}

async function run(cmd) {
  switch (cmd.op) {
    case 'launch': {
      browser = await playwright[cmd.browser].launch({ headless: cmd.headless });
      const context = await browser.newContext({ baseURL: cmd.baseUrl, viewport: cmd.viewport });
      context.setDefaultTimeout(cmd.actionTimeout);
      page = await context.newPage();
      return null;
    }
    case 'close': await browser.close(); return null;
    case 'goto': await page.goto(cmd.url); return null;
    case 'url': return page.url();
    case 'count': return await build(cmd.locator).count();
    case 'isVisible': {
      const loc = build(cmd.locator);
      const n = await loc.count();
      for (let i = 0; i < n; i++) if (await loc.nth(i).isVisible()) return true;
      return false;
    }
    case 'waitFor': await build(cmd.locator).waitFor({ state: cmd.state, timeout: cmd.timeout }); return null;
    case 'click': await build(cmd.locator).click({ force: cmd.force }); return null;
    case 'fill': await build(cmd.locator).fill(cmd.value); return null;
    case 'setChecked': await build(cmd.locator).setChecked(cmd.checked, { force: cmd.force }); return null;
    case 'textContent': return await build(cmd.locator).textContent();
    case 'getAttribute': return await build(cmd.locator).getAttribute(cmd.name);
    case 'inputValue': return await build(cmd.locator).inputValue();
    case 'scrollIntoView':
      await build(cmd.locator).evaluate(el => el.scrollIntoView({ block: 'center', inline: 'nearest' }));
      return null;
    case 'mouseMove': await page.mouse.move(cmd.x, cmd.y); return null;
    case 'mouseDown': await page.mouse.down(); return null;
    case 'mouseUp': await page.mouse.up(); return null;
  }
  throw new Error('unknown op ' + cmd.op);
}

const rl = readline.createInterface({ input: process.stdin });
let queue = Promise.resolve();
rl.on('line', (line) => {
  queue = queue.then(async () => {
    const cmd = JSON.parse(line);
    try {
      const value = await run(cmd);
      process.stdout.write(JSON.stringify({ id: cmd.id, ok: true, value: value ?? null }) + '\n');
    } catch (error) {
      const timeout = error && error.name === 'TimeoutError';
      process.stdout.write(JSON.stringify({ id: cmd.id, ok: false, error: error.message, timeout }) + '\n');
    }
    if (cmd.op === 'close') process.exit(0);
  });
});
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::AriaRole;

    #[test]
    fn locator_wire_format_keeps_segment_order() {
        let sidebar = Locator::css("nb-sidebar, aside").first();
        let link = sidebar
            .role_within(AriaRole::Link, Some(TextMatch::exact_ignore_case("Tooltip")))
            .self_tag("a")
            .first();

        let wire = locator_json(&link);
        let segments = wire.as_array().unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0]["selector"]["kind"], "css");
        assert_eq!(segments[0]["nth"], 0);
        assert_eq!(segments[1]["selector"]["role"], "link");
        assert_eq!(segments[1]["selector"]["name"]["kind"], "exactIgnoreCase");
        assert_eq!(segments[1]["selfTag"], "a");
    }

    #[test]
    fn pattern_wire_format_carries_flags() {
        let text = TextMatch::pattern_ignore_case("Tooltip (With Icon|Placements)").unwrap();
        let wire = text_json(&text);
        assert_eq!(wire["kind"], "pattern");
        assert_eq!(wire["ignoreCase"], true);
        assert_eq!(wire["source"], "Tooltip (With Icon|Placements)");
    }

    fn timed_out(id: u64) -> Reply {
        Reply {
            id,
            ok: false,
            value: Value::Null,
            error: Some("locator.click: Timeout 10000ms exceeded.".to_string()),
            timeout: true,
        }
    }

    #[test]
    fn action_timeout_fills_in_for_commands_without_one() {
        let command = json!({ "op": "click", "force": false });
        let err = reply_result(timed_out(1), &command, Duration::from_secs(10)).unwrap_err();
        assert!(matches!(err, DriverError::Timeout { timeout_ms: 10_000, .. }));
    }

    #[test]
    fn explicit_command_timeout_wins() {
        let command = json!({ "op": "waitFor", "state": "visible", "timeout": 250 });
        let err = reply_result(timed_out(2), &command, Duration::from_secs(10)).unwrap_err();
        match err {
            DriverError::Timeout { what, timeout_ms } => {
                assert_eq!(timeout_ms, 250);
                assert!(what.contains("Timeout 10000ms"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
