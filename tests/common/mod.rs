#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use page_harvest::{Config, FetchError, Renderer, Task};

/// 内存渲染器：按索引生成固定页面，可注入失败与延迟
#[derive(Clone, Default)]
pub struct FakeRenderer {
    state: Arc<FakeState>,
}

#[derive(Default)]
struct FakeState {
    calls: AtomicUsize,
    live: AtomicUsize,
    max_live: AtomicUsize,
    failing: Mutex<HashSet<usize>>,
    fatal: Mutex<HashSet<usize>>,
    panicking: Mutex<HashSet<usize>>,
    delays: Mutex<HashMap<usize, Duration>>,
    rendered: Mutex<Vec<usize>>,
}

impl FakeRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, indices: &[usize]) {
        *self.state.failing.lock().unwrap() = indices.iter().copied().collect();
    }

    pub fn set_fatal(&self, indices: &[usize]) {
        *self.state.fatal.lock().unwrap() = indices.iter().copied().collect();
    }

    pub fn set_panicking(&self, indices: &[usize]) {
        *self.state.panicking.lock().unwrap() = indices.iter().copied().collect();
    }

    pub fn set_delays(&self, delays: impl IntoIterator<Item = (usize, Duration)>) {
        *self.state.delays.lock().unwrap() = delays.into_iter().collect();
    }

    pub fn calls(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }

    pub fn max_live(&self) -> usize {
        self.state.max_live.load(Ordering::SeqCst)
    }

    pub fn rendered(&self) -> Vec<usize> {
        self.state.rendered.lock().unwrap().clone()
    }

    fn delay_for(&self, index: usize) -> Duration {
        self.state
            .delays
            .lock()
            .unwrap()
            .get(&index)
            .copied()
            // 打乱完成顺序
            .unwrap_or_else(|| Duration::from_millis(((index * 7) % 5) as u64))
    }
}

impl Renderer for FakeRenderer {
    async fn render(&self, task: &Task) -> Result<String, FetchError> {
        let state = &self.state;
        state.calls.fetch_add(1, Ordering::SeqCst);
        let live = state.live.fetch_add(1, Ordering::SeqCst) + 1;
        state.max_live.fetch_max(live, Ordering::SeqCst);

        let delay = self.delay_for(task.index);
        tokio::time::sleep(delay).await;

        state.live.fetch_sub(1, Ordering::SeqCst);
        state.rendered.lock().unwrap().push(task.index);

        let panics = state.panicking.lock().unwrap().contains(&task.index);
        if panics {
            panic!("renderer blew up on {}", task);
        }
        if state.fatal.lock().unwrap().contains(&task.index) {
            return Err(FetchError::SessionSetup {
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only tmp"),
            });
        }
        if state.failing.lock().unwrap().contains(&task.index) {
            return Err(FetchError::Timeout { secs: 1 });
        }
        Ok(shabda_page(task.index))
    }
}

/// 与 shabda 模板匹配的页面
pub fn shabda_page(index: usize) -> String {
    format!(
        r#"<html><body>
          <div class="pt-2 mb-2 d-flex justify-content-between">
            <span class="text-font align-middle text-secondary">{index}</span>
            <span class="title-font font-weight-bold">शब्द</span>
          </div>
          <table class="table table-layout-fixed bg-light table-bordered"><tbody>
            <tr><td>प्रथमा</td><td>row-{index}</td></tr>
          </tbody></table>
          <div class="text-font">
            <span class="list-item-title-color">Entry</span><span class="dark">{index}</span>
          </div>
        </body></html>"#
    )
}

pub fn locators(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| format!("https://ashtadhyayi.com/shabda/{i}"))
        .collect()
}

/// 在 `dir` 下写出链接列表并返回指向它的测试配置
pub fn test_config(dir: &Path, n: usize) -> Config {
    let locator_file = dir.join("links.json");
    std::fs::write(&locator_file, serde_json::to_string(&locators(n)).unwrap()).unwrap();

    Config {
        locator_file,
        output_dir: dir.join("out"),
        file_prefix: "shabda".to_string(),
        schema: "shabda".to_string(),
        start_index: 0,
        end_index: None,
        batch_width: 5,
        max_workers: 3,
        wait_timeout_secs: 1,
        settle_delay_ms: 0,
        pacing_delay_ms: 0,
        headless: true,
        chrome_executable: None,
        verbose_logging: false,
    }
}

pub fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

/// 批次文件中每条记录的索引
pub fn record_indices(content: &str) -> Vec<usize> {
    if content.is_empty() {
        return Vec::new();
    }
    content
        .split("\n\n")
        .map(|block| {
            let head = block.lines().next().unwrap();
            head[1..head.find(']').unwrap()].parse().unwrap()
        })
        .collect()
}

/// 目录中的文件名（排序）
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

pub fn out_path(config: &Config, name: &str) -> PathBuf {
    config.output_dir.join(name)
}
