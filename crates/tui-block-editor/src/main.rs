//! 终端块编辑器
//!
//! 使用 crossterm 和 ratatui 构建，基于 `block-editor-core`：每一行是一个块（段落或待办事项），
//! Enter/Backspace/方向键交给编辑器内核的分派器处理，其余按键按终端默认行为编辑当前块。
//!
//! # 用法
//!
//! ```bash
//! cargo run -p tui-block-editor -- --todo
//! cargo run -p tui-block-editor -- --store notes.json --key journal --log editor.log
//! cargo run -p tui-block-editor -- --todo --import list.md
//! cargo run -p tui-block-editor -- --todo --export > list.md
//! ```
//!
//! 日志级别通过 `RUST_LOG` 设置，例如 `RUST_LOG=block_editor_core=trace`。
//!
//! # 快捷键
//!
//! - Enter: 拆分/新建块
//! - Backspace: 删除字符；块首时合并到上一块
//! - 方向键: 移动光标（跨块时保持列位置）
//! - Home/End: 块首/块尾
//! - Ctrl+T: 切换待办完成状态
//! - Ctrl+S: 保存
//! - Ctrl+Q: 退出
//! - 鼠标左键: 定位光标

mod store;

use block_editor_core::{
    BlockEditor, BlockId, ChecklistCodec, Document, DocumentStore, EditorConfig, HeadlessSurface,
    Key, KeyOutcome, Variant,
};
use clap::Parser;
use crossterm::{
    event::{
        self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
        Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
        MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use std::{
    fs,
    io::{self, stdout},
    path::{Path, PathBuf},
    sync::Mutex,
    time::Duration,
};
use store::JsonFileStore;
use tracing_subscriber::EnvFilter;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// 待办模式下每行前的复选框宽度（`[ ] `）
const CHECKBOX_WIDTH: usize = 4;

#[derive(Parser, Debug)]
#[command(name = "tui-block-editor")]
#[command(about = "Terminal block editor for notes and to-do lists", long_about = None)]
struct Args {
    /// JSON 存储文件
    #[arg(long, default_value = "blocks.json")]
    store: PathBuf,

    /// 存储键（默认：笔记 `blocks`，待办 `todos`）
    #[arg(long)]
    key: Option<String>,

    /// 待办模式（带复选框，自动保存）
    #[arg(long)]
    todo: bool,

    /// 日志文件（终端处于 raw 模式，日志不能写到 stderr）
    #[arg(long)]
    log: Option<PathBuf>,

    /// 从 Markdown 任务列表导入，替换已存储的文档
    #[arg(long)]
    import: Option<PathBuf>,

    /// 以任务列表格式打印已存储的文档并退出
    #[arg(long)]
    export: bool,
}

impl Args {
    fn config(&self) -> EditorConfig {
        let config = if self.todo {
            EditorConfig::todo()
        } else {
            EditorConfig::default()
        };
        match &self.key {
            Some(key) => config.with_storage_key(key.clone()),
            None => config,
        }
    }
}

/// 字素簇边界（字符偏移），包含 0 和文本长度
fn grapheme_boundaries(text: &str) -> Vec<usize> {
    let mut boundaries = vec![0];
    let mut offset = 0;
    for grapheme in text.graphemes(true) {
        offset += grapheme.chars().count();
        boundaries.push(offset);
    }
    boundaries
}

fn previous_boundary(text: &str, offset: usize) -> usize {
    grapheme_boundaries(text)
        .into_iter()
        .rev()
        .find(|b| *b < offset)
        .unwrap_or(0)
}

fn next_boundary(text: &str, offset: usize) -> usize {
    grapheme_boundaries(text)
        .into_iter()
        .find(|b| *b > offset)
        .unwrap_or(offset)
}

/// 屏幕列 -> 字符偏移（落在宽字符中间时取其起点）
fn offset_for_column(text: &str, column: usize) -> usize {
    let mut width = 0;
    let mut offset = 0;
    for grapheme in text.graphemes(true) {
        let w = UnicodeWidthStr::width(grapheme);
        if width + w > column {
            break;
        }
        width += w;
        offset += grapheme.chars().count();
    }
    offset
}

/// 字符偏移 -> 屏幕列
fn column_for_offset(text: &str, offset: usize) -> usize {
    let prefix: String = text.chars().take(offset).collect();
    UnicodeWidthStr::width(prefix.as_str())
}

/// 光标的屏幕列：超出编辑区域时停在右边框内侧
fn cursor_column(inner_left: u16, inner_right: u16, x: usize) -> u16 {
    let x = u16::try_from(x).unwrap_or(u16::MAX);
    inner_left.saturating_add(x).min(inner_right)
}

struct App {
    /// 编辑器（分派器 + 版本/通知 + 持久化）
    editor: BlockEditor<HeadlessSurface>,
    /// 存储文件路径（用于状态提示）
    store_path: PathBuf,
    /// 是否需要退出
    should_quit: bool,
    /// 确认退出模式（如果有未保存修改）
    confirm_quit: bool,
    /// 状态消息
    status_message: String,
    /// 第一行可见块的下标
    scroll_top: usize,
    /// 上一帧编辑区域（用于鼠标定位）
    editor_area: Rect,
}

impl App {
    fn new(mut editor: BlockEditor<HeadlessSurface>, store_path: PathBuf) -> Self {
        editor.subscribe(|change| {
            tracing::trace!(
                kind = ?change.change_type,
                version = change.new_version,
                "state changed"
            );
        });

        Self {
            editor,
            store_path,
            should_quit: false,
            confirm_quit: false,
            status_message: String::new(),
            scroll_top: 0,
            editor_area: Rect::default(),
        }
    }

    fn is_todo(&self) -> bool {
        self.editor.config().variant == Variant::Todo
    }

    /// 交给分派器处理；返回是否继续执行默认行为
    fn dispatch(&mut self, key: Key) -> bool {
        match self.editor.handle_key(key) {
            Ok(result) => result.outcome == KeyOutcome::AllowDefault,
            Err(err) => {
                tracing::warn!(?key, error = %err, "key not handled");
                self.status_message = format!("按键未处理: {}", err);
                false
            }
        }
    }

    /// 把表面上的文本变化同步回文档
    fn report(&mut self, reported: Option<(BlockId, String)>) {
        let Some((block, text)) = reported else {
            return;
        };
        if let Err(err) = self.editor.handle_input(block, text) {
            self.status_message = format!("输入未同步: {}", err);
        }
    }

    /// 默认行为移动光标后，把新位置告诉编辑器（记忆列从这里重新开始）
    fn move_caret(&mut self, offset: usize) {
        self.editor.surface_mut().move_caret_to(offset);
        if let Err(err) = self.editor.caret_moved() {
            self.status_message = format!("光标未同步: {}", err);
        }
    }

    fn focused_text(&self) -> Option<(String, usize)> {
        self.editor
            .caret_position()
            .map(|position| (position.text, position.offset))
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        // 确认退出模式
        if self.confirm_quit {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    self.save();
                    if self.editor.last_save_error().is_none() {
                        self.should_quit = true;
                    } else {
                        self.confirm_quit = false;
                    }
                }
                KeyCode::Char('n') | KeyCode::Char('N') => {
                    self.should_quit = true;
                }
                KeyCode::Esc => {
                    self.confirm_quit = false;
                    self.status_message.clear();
                }
                _ => {}
            }
            return;
        }

        match (key.modifiers, key.code) {
            // Ctrl+Q: 退出
            (KeyModifiers::CONTROL, KeyCode::Char('q')) => {
                if self.editor.is_modified() {
                    self.confirm_quit = true;
                    self.status_message = "文档已修改。保存吗? (y/n)".to_string();
                } else {
                    self.should_quit = true;
                }
            }

            // Ctrl+S: 保存
            (KeyModifiers::CONTROL, KeyCode::Char('s')) => self.save(),

            // Ctrl+T: 切换完成状态
            (KeyModifiers::CONTROL, KeyCode::Char('t')) => self.toggle_focused(),

            (_, KeyCode::Enter) => {
                self.dispatch(Key::Enter);
            }

            (_, KeyCode::Backspace) => {
                if self.dispatch(Key::Backspace)
                    && let Some((text, offset)) = self.focused_text()
                {
                    let count = offset - previous_boundary(&text, offset);
                    let reported = self.editor.surface_mut().delete_before_caret(count);
                    self.report(reported);
                }
            }

            (_, KeyCode::Delete) => {
                if self.dispatch(Key::Other)
                    && let Some((text, offset)) = self.focused_text()
                {
                    let count = next_boundary(&text, offset) - offset;
                    let reported = self.editor.surface_mut().delete_after_caret(count);
                    self.report(reported);
                }
            }

            (_, KeyCode::Left) => {
                if self.dispatch(Key::ArrowLeft)
                    && let Some((text, offset)) = self.focused_text()
                {
                    self.move_caret(previous_boundary(&text, offset));
                }
            }

            (_, KeyCode::Right) => {
                if self.dispatch(Key::ArrowRight)
                    && let Some((text, offset)) = self.focused_text()
                {
                    self.move_caret(next_boundary(&text, offset));
                }
            }

            // 第一块按 Up / 最后一块按 Down：移到块首/块尾
            (_, KeyCode::Up) => {
                if self.dispatch(Key::ArrowUp) {
                    self.editor.surface_mut().move_caret_to(0);
                }
            }

            (_, KeyCode::Down) => {
                if self.dispatch(Key::ArrowDown) {
                    self.editor.surface_mut().move_caret_to(usize::MAX);
                }
            }

            (_, KeyCode::Home) => {
                if self.dispatch(Key::Other) {
                    self.move_caret(0);
                }
            }

            (_, KeyCode::End) => {
                if self.dispatch(Key::Other) {
                    self.move_caret(usize::MAX);
                }
            }

            (modifiers, KeyCode::Char(c))
                if !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                if self.dispatch(Key::Other) {
                    let reported = self.editor.surface_mut().insert_at_caret(&c.to_string());
                    self.report(reported);
                }
            }

            _ => {}
        }
    }

    fn handle_paste(&mut self, text: String) {
        // 块内是纯文本，换行折叠为空格
        let text = text.replace(['\r', '\n'], " ");
        if self.dispatch(Key::Other) {
            let reported = self.editor.surface_mut().insert_at_caret(&text);
            self.report(reported);
        }
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }

        let area = self.editor_area;
        let inner_left = area.x + 1;
        let inner_top = area.y + 1;
        let inner_right = area.x + area.width.saturating_sub(1);
        let inner_bottom = area.y + area.height.saturating_sub(1);
        if mouse.column < inner_left
            || mouse.column >= inner_right
            || mouse.row < inner_top
            || mouse.row >= inner_bottom
        {
            return;
        }

        let row = (mouse.row - inner_top) as usize + self.scroll_top;
        let Some(node) = self.editor.surface().nodes().get(row) else {
            return;
        };
        let block = node.block();

        let prefix = if self.is_todo() { CHECKBOX_WIDTH } else { 0 };
        let column = ((mouse.column - inner_left) as usize).saturating_sub(prefix);
        let offset = offset_for_column(node.text(), column);

        if self.editor.surface_mut().place_caret(block, offset)
            && let Err(err) = self.editor.handle_pointer()
        {
            self.status_message = format!("定位失败: {}", err);
        }
    }

    fn toggle_focused(&mut self) {
        if !self.is_todo() {
            self.status_message = "仅待办模式可切换完成状态".to_string();
            return;
        }
        let Some(position) = self.editor.caret_position() else {
            return;
        };

        match self.editor.toggle_checked(position.block_id) {
            Ok(true) => self.status_message = "已完成".to_string(),
            Ok(false) => self.status_message = "未完成".to_string(),
            Err(err) => self.status_message = format!("切换失败: {}", err),
        }
    }

    fn save(&mut self) {
        match self.editor.save() {
            Ok(()) => {
                self.status_message = format!("已保存: {}", self.store_path.display());
            }
            Err(err) => {
                self.status_message = format!("保存失败: {}", err);
            }
        }
    }

    /// 本帧已经画出表面上的全部内容，确认所有待绘制的更新
    fn commit_paints(&mut self) {
        for token in self.editor.surface_mut().take_uncommitted_paints() {
            if let Err(err) = self.editor.paint_committed(token) {
                tracing::warn!(token = token.value(), error = %err, "paint commit failed");
            }
        }
    }

    fn focused_row(&self) -> Option<usize> {
        let surface = self.editor.surface();
        let focused = surface.focused_block()?;
        surface.nodes().iter().position(|n| n.block() == focused)
    }

    fn adjust_scroll(&mut self, viewport_height: usize) {
        let Some(row) = self.focused_row() else {
            return;
        };
        if viewport_height == 0 {
            return;
        }
        if row < self.scroll_top {
            self.scroll_top = row;
        } else if row >= self.scroll_top + viewport_height {
            self.scroll_top = row + 1 - viewport_height;
        }
    }

    /// 渲染 UI
    fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),    // 编辑器区域
                Constraint::Length(1), // 状态行
                Constraint::Length(1), // 快捷键提示
            ])
            .split(frame.area());

        self.editor_area = chunks[0];
        self.adjust_scroll(chunks[0].height.saturating_sub(2) as usize);

        self.render_blocks(frame, chunks[0]);
        self.render_status_line(frame, chunks[1]);
        self.render_shortcuts(frame, chunks[2]);
    }

    /// 渲染块列表（直接画表面上的节点）
    fn render_blocks(&self, frame: &mut Frame, area: Rect) {
        let surface = self.editor.surface();
        let todo = self.is_todo();
        let height = area.height.saturating_sub(2) as usize;

        let lines: Vec<Line> = surface
            .nodes()
            .iter()
            .skip(self.scroll_top)
            .take(height)
            .map(|node| {
                let done = node.checked() == Some(true);
                let mut spans = Vec::new();
                if todo {
                    let mark = if done { "[x] " } else { "[ ] " };
                    spans.push(Span::styled(mark, Style::default().fg(Color::Cyan)));
                }
                let style = if done {
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::CROSSED_OUT)
                } else {
                    Style::default()
                };
                spans.push(Span::styled(node.text().to_string(), style));
                Line::from(spans)
            })
            .collect();

        let title = if todo { " Today's Todos " } else { " Notes " };
        let paragraph =
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(paragraph, area);

        // 光标
        let Some(row) = self.focused_row() else {
            return;
        };
        if row < self.scroll_top || row >= self.scroll_top + height {
            return;
        }
        let Some(node) = surface.nodes().get(row) else {
            return;
        };

        let inner_left = area.x + 1;
        let inner_right = area.x + area.width.saturating_sub(2);
        let prefix = if todo { CHECKBOX_WIDTH } else { 0 };
        let x = prefix + column_for_offset(node.text(), surface.caret_offset());
        let cursor_x = cursor_column(inner_left, inner_right, x);
        let cursor_y = area.y + 1 + (row - self.scroll_top) as u16;
        frame.set_cursor_position((cursor_x, cursor_y));
    }

    /// 渲染状态行
    fn render_status_line(&self, frame: &mut Frame, area: Rect) {
        let status_text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else {
            let block_count = self.editor.document().len();
            let (row, column) = match (self.focused_row(), self.editor.caret_position()) {
                (Some(row), Some(position)) => (row + 1, position.offset + 1),
                _ => (0, 0),
            };
            format!(
                "块:{}/{} 列:{} | 记忆列:{} | 版本:{}{}",
                row,
                block_count,
                column,
                self.editor.dispatcher().remembered_column(),
                self.editor.version(),
                if self.editor.is_modified() { " | 已修改" } else { "" }
            )
        };

        let status_line = Paragraph::new(status_text).style(
            Style::default()
                .bg(Color::DarkGray)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );

        frame.render_widget(status_line, area);
    }

    /// 渲染快捷键提示
    fn render_shortcuts(&self, frame: &mut Frame, area: Rect) {
        let shortcuts = if self.confirm_quit {
            "Y:保存并退出  N:不保存退出  Esc:取消"
        } else if self.is_todo() {
            "Enter:拆分/新建  Backspace:合并  Ctrl-T:完成  Ctrl-S:保存  Ctrl-Q:退出"
        } else {
            "Enter:拆分/新建  Backspace:合并  Ctrl-S:保存  Ctrl-Q:退出"
        };

        let shortcuts_line =
            Paragraph::new(shortcuts).style(Style::default().bg(Color::Blue).fg(Color::White));

        frame.render_widget(shortcuts_line, area);
    }
}

fn init_tracing(path: &Path) -> io::Result<()> {
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> io::Result<()> {
    let args = Args::parse();
    if let Some(path) = &args.log {
        init_tracing(path)?;
    }

    let config = args.config();
    let store = JsonFileStore::new(&args.store);
    let codec = ChecklistCodec::new().map_err(io::Error::other)?;

    if args.export {
        let document = store
            .load(&config.storage_key)
            .map_err(io::Error::other)?
            .unwrap_or_else(|| Document::seeded(config.variant));
        print!("{}", codec.render(&document));
        return Ok(());
    }

    // 表面更新要等下一帧画出来才算完成
    let surface = HeadlessSurface::deferred();
    let editor = match &args.import {
        Some(path) => {
            let text = fs::read_to_string(path)?;
            let document = codec.parse(&text, config.variant);
            tracing::info!(path = %path.display(), blocks = document.len(), "imported checklist");
            let mut editor = BlockEditor::new(document, surface, config).with_store(store.clone());
            editor.save().map_err(io::Error::other)?;
            editor
        }
        None => BlockEditor::open(surface, config, store.clone()).map_err(io::Error::other)?,
    };

    // 设置终端
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(editor, store.path().to_path_buf());

    // 主循环
    let result = run_app(&mut terminal, &mut app);

    // 恢复终端
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("错误: {}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| app.render(f))?;
        app.commit_paints();

        if app.should_quit {
            break;
        }

        // 处理事件
        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) => {
                    app.handle_key_event(key);
                }
                Event::Paste(text) => {
                    app.handle_paste(text);
                }
                Event::Mouse(mouse) => {
                    app.handle_mouse_event(mouse);
                }
                Event::Resize(_, _) => {
                    // 重新渲染
                }
                _ => {}
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grapheme_boundaries() {
        // "e" + 组合重音符 是一个字素簇、两个字符
        let text = "ae\u{301}b";
        assert_eq!(grapheme_boundaries(text), vec![0, 1, 3, 4]);
        assert_eq!(previous_boundary(text, 3), 1);
        assert_eq!(next_boundary(text, 1), 3);
        assert_eq!(next_boundary(text, 4), 4);
        assert_eq!(previous_boundary(text, 0), 0);
    }

    #[test]
    fn test_columns_for_wide_characters() {
        let text = "日本a";
        assert_eq!(column_for_offset(text, 0), 0);
        assert_eq!(column_for_offset(text, 2), 4);
        assert_eq!(column_for_offset(text, 3), 5);

        assert_eq!(offset_for_column(text, 3), 1);
        assert_eq!(offset_for_column(text, 4), 2);
        assert_eq!(offset_for_column(text, 99), 3);
    }

    #[test]
    fn test_cursor_column_saturates() {
        assert_eq!(cursor_column(1, 78, 5), 6);
        assert_eq!(cursor_column(1, 78, 500), 78);
        assert_eq!(cursor_column(1, 78, usize::MAX), 78);
        assert_eq!(cursor_column(u16::MAX - 1, u16::MAX, 70_000), u16::MAX);
    }

    fn app(texts: &[&str]) -> App {
        let blocks = texts
            .iter()
            .map(|t| block_editor_core::Block::new(*t))
            .collect();
        let document = Document::from_blocks(blocks).unwrap();
        let editor = BlockEditor::new(document, HeadlessSurface::new(), EditorConfig::default());
        App::new(editor, PathBuf::from("blocks.json"))
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn test_home_then_down_keeps_start_column() {
        let mut app = app(&["abcdef", "uvwxyz"]);
        press(&mut app, KeyCode::End);
        press(&mut app, KeyCode::Home);
        press(&mut app, KeyCode::Down);

        let position = app.editor.caret_position().unwrap();
        assert_eq!(position.block_id, app.editor.document().ids()[1]);
        assert_eq!(position.offset, 0);
    }

    #[test]
    fn test_left_moves_remembered_column() {
        let mut app = app(&["abcdef", "uvwxyz"]);
        press(&mut app, KeyCode::End);
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Left);
        assert_eq!(app.editor.dispatcher().remembered_column(), 4);

        press(&mut app, KeyCode::Down);
        assert_eq!(app.editor.caret_position().unwrap().offset, 4);
    }

    #[test]
    fn test_args_map_to_config() {
        let args = Args::parse_from(["tui-block-editor", "--todo", "--key", "work"]);
        let config = args.config();
        assert_eq!(config.variant, Variant::Todo);
        assert_eq!(config.storage_key, "work");
        assert!(config.autosave);
        assert_eq!(args.store, PathBuf::from("blocks.json"));
    }
}
