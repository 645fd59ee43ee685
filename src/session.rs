//! Interactive review session: batches, layout, decisions, trash.

use crate::batch::{Batch, BatchSelector, Decision, DecisionState};
use crate::cli::AppConfig;
use crate::config::UserConfig;
use crate::discover::{discover, ImageCandidate, TraversalConfig};
use crate::error::{PicsweepError, Result};
use crate::input::{handle_key_event, SessionAction};
use crate::layout::{compute_layout, ImageDimensions, LayoutMode, LayoutPlan};
use crate::metrics::{self, TerminalMetrics};
use crate::render::{abbreviate_path, display_inline, read_dimensions};
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal;
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Rows held back from the layout budget for the prompt and status chrome.
const UI_ROWS: u16 = 5;

/// Native dimensions are read once per image and reused for every
/// re-layout within the session.
#[derive(Debug, Default)]
pub struct DimensionCache {
    dims: HashMap<PathBuf, ImageDimensions>,
}

impl DimensionCache {
    pub fn get(&mut self, path: &Path) -> Result<ImageDimensions> {
        if let Some(d) = self.dims.get(path) {
            return Ok(*d);
        }
        let d = read_dimensions(path)?;
        self.dims.insert(path.to_path_buf(), d);
        Ok(d)
    }
}

/// A layout plan covering exactly the still-pending members of a batch.
#[derive(Debug)]
pub struct PendingLayout {
    pub members: Vec<ImageCandidate>,
    pub plan: LayoutPlan,
}

/// Lays out the still-pending members of `batch` against a fresh metrics
/// snapshot. Decided members are excluded, which is what makes a restart or
/// screen-clear redraw only what is left to review.
pub fn layout_pending(
    batch: &Batch,
    cache: &mut DimensionCache,
    metrics: &TerminalMetrics,
    mode: LayoutMode,
) -> Result<PendingLayout> {
    let members: Vec<ImageCandidate> = batch
        .undecided_members()
        .into_iter()
        .cloned()
        .collect();

    let mut dims = Vec::with_capacity(members.len());
    for member in &members {
        dims.push(cache.get(&member.path)?);
    }

    let plan = compute_layout(&dims, metrics, mode)?;
    Ok(PendingLayout { members, plan })
}

/// Counts reported when the session ends.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub total: usize,
    pub kept: usize,
    pub trashed: usize,
}

/// Moves `path` to the system trash, mapping collaborator failures so the
/// caller can leave the decision state untouched.
fn move_to_trash(path: &Path) -> Result<()> {
    trash::delete(path).map_err(|source| PicsweepError::TrashFailed {
        path: path.to_path_buf(),
        source,
    })
}

/// Waits for the next key press from `events`, ignoring releases, repeats,
/// and non-key events.
fn next_key_action(mut events: impl FnMut() -> io::Result<Event>) -> io::Result<SessionAction> {
    loop {
        match events()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                return Ok(handle_key_event(key))
            }
            _ => continue,
        }
    }
}

/// Reads one key press, entering raw mode only for the read so all printing
/// stays in cooked mode. Raw mode is restored even when the event source
/// fails, so an error never leaks a raw terminal to the caller.
fn read_key() -> io::Result<SessionAction> {
    terminal::enable_raw_mode()?;
    let action = next_key_action(event::read);
    let restored = terminal::disable_raw_mode();
    let action = action?;
    restored?;
    Ok(action)
}

fn bell() {
    print!("\x07");
    let _ = io::stdout().flush();
}

fn clear_screen() {
    print!("\x1b[2J\x1b[H");
    let _ = io::stdout().flush();
}

/// The interactive state machine. Owns the selector, the active batch, the
/// dimension cache, and the mode toggle; everything is passed explicitly,
/// nothing lives in globals.
pub struct Session {
    selector: BatchSelector,
    cache: DimensionCache,
    mode: LayoutMode,
    summary: SessionSummary,
}

enum BatchOutcome {
    Continue,
    Quit,
}

impl Session {
    pub fn new(candidates: Vec<ImageCandidate>, config: &AppConfig, user_config: &UserConfig) -> Self {
        let total = candidates.len();
        let mut selector = BatchSelector::new(candidates);
        if config.shuffle {
            selector.shuffle(config.seed);
        }
        Session {
            selector,
            cache: DimensionCache::default(),
            mode: config.mode.unwrap_or(user_config.default_mode),
            summary: SessionSummary {
                total,
                ..SessionSummary::default()
            },
        }
    }

    /// Drives the loop batch by batch until candidates run out or the user
    /// quits. Single thread; every user-visible action runs to completion
    /// before the next one is accepted.
    pub fn run(&mut self) -> Result<SessionSummary> {
        while let Some(mut batch) = self.selector.next_batch() {
            match self.review_batch(&mut batch)? {
                BatchOutcome::Continue => continue,
                BatchOutcome::Quit => break,
            }
        }
        Ok(self.summary)
    }

    fn review_batch(&mut self, batch: &mut Batch) -> Result<BatchOutcome> {
        loop {
            let pending = match self.present(batch) {
                Ok(p) => p,
                Err(PicsweepError::DegenerateMetrics { detail }) => {
                    eprintln!(
                        "Cannot lay out images: {} (resize the terminal or use one that reports pixel sizes, any key retries, q quits)",
                        detail
                    );
                    match read_key()? {
                        SessionAction::Quit => return Ok(BatchOutcome::Quit),
                        _ => continue,
                    }
                }
                Err(e) => return Err(e),
            };

            match self.decide(batch, &pending)? {
                DecideOutcome::Done => break,
                DecideOutcome::Relayout => continue,
                DecideOutcome::Quit => return Ok(BatchOutcome::Quit),
            }
        }

        // Batch complete: continue or quit
        println!("\n[c]ontinue, [q]uit: ");
        loop {
            match read_key()? {
                SessionAction::Continue => return Ok(BatchOutcome::Continue),
                SessionAction::Quit => return Ok(BatchOutcome::Quit),
                _ => bell(),
            }
        }
    }

    /// Probes metrics fresh, lays out the pending members, and paints them.
    fn present(&mut self, batch: &Batch) -> Result<PendingLayout> {
        let raw = metrics::probe()?;
        let pending_count = batch.undecided_members().len() as u16;
        // One label line per image, plus the prompt chrome
        let working = raw.reserve_rows(UI_ROWS + pending_count);

        let pending = layout_pending(batch, &mut self.cache, &working, self.mode)?;

        let mut stdout = io::stdout();
        for entry in &pending.plan.entries {
            let member = &pending.members[entry.index];
            if let Err(e) = display_inline(&mut stdout, &member.path, entry.render_width_cols) {
                eprintln!(
                    "Failed to display {}: {}",
                    abbreviate_path(&member.path, raw.columns as usize),
                    e
                );
                continue;
            }
            println!("{}", abbreviate_path(&member.path, raw.columns as usize));
        }
        println!(
            "Reviewing {} of {} remaining ({:?} layout)",
            pending.members.len(),
            self.selector.remaining_count() + batch.undecided_members().len(),
            self.mode
        );

        Ok(pending)
    }

    /// Prompts for a decision on each pending member in order.
    fn decide(&mut self, batch: &mut Batch, pending: &PendingLayout) -> Result<DecideOutcome> {
        for (slot, member) in pending.members.iter().enumerate() {
            loop {
                self.prompt_row(batch, pending, slot);

                match read_key()? {
                    SessionAction::Keep => {
                        batch.apply_decision(&member.path, Decision::Keep)?;
                        self.summary.kept += 1;
                        break;
                    }
                    SessionAction::Trash => match move_to_trash(&member.path) {
                        Ok(()) => {
                            batch.apply_decision(&member.path, Decision::Trash)?;
                            self.summary.trashed += 1;
                            break;
                        }
                        Err(e) => {
                            // Decision state stays Pending; the user may
                            // retry or keep instead
                            eprintln!("\n{}", e);
                            bell();
                        }
                    },
                    SessionAction::Info => {
                        self.print_image_info(member);
                    }
                    SessionAction::BatchInfo => {
                        self.print_batch_info(pending);
                    }
                    SessionAction::Redraw | SessionAction::Restart => {
                        clear_screen();
                        return Ok(DecideOutcome::Relayout);
                    }
                    SessionAction::ToggleMode => {
                        self.toggle_mode();
                        clear_screen();
                        return Ok(DecideOutcome::Relayout);
                    }
                    SessionAction::Quit => return Ok(DecideOutcome::Quit),
                    SessionAction::Continue | SessionAction::None => bell(),
                }
            }
        }
        Ok(DecideOutcome::Done)
    }

    /// One-line prompt mirroring the batch: decided slots show their letter,
    /// the current slot is bold, upcoming slots are dim.
    fn prompt_row(&self, batch: &Batch, pending: &PendingLayout, current: usize) {
        let mut line = String::new();
        for (i, member) in pending.members.iter().enumerate() {
            if i == current {
                line.push_str("\x1b[1m[k/b]\x1b[0m ");
            } else if i < current {
                let letter = match batch.decision_for(&member.path) {
                    Some(DecisionState::Keep) => 'k',
                    Some(DecisionState::Trashed) => 'b',
                    _ => '?',
                };
                line.push_str(&format!("[{}]   ", letter));
            } else {
                line.push_str("\x1b[2m[k/b]\x1b[0m ");
            }
        }
        let cols = terminal::size().map(|(c, _)| c as usize).unwrap_or(80);
        line.push_str(&format!(
            "  {}",
            abbreviate_path(&pending.members[current].path, cols.saturating_sub(20))
        ));

        print!("\r\x1b[K{}", line);
        let _ = io::stdout().flush();
    }

    fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            LayoutMode::Uniform => LayoutMode::EqualBudget,
            LayoutMode::EqualBudget => LayoutMode::Uniform,
        };
        let config = UserConfig {
            default_mode: self.mode,
        };
        if let Err(e) = config.save() {
            eprintln!("Warning: failed to save preferences: {}", e);
        }
    }

    fn print_image_info(&mut self, member: &ImageCandidate) {
        match self.cache.get(&member.path) {
            Ok(d) => {
                println!("\n\nImage info:");
                println!("  File:     {}", member.path.display());
                println!("  Native:   {} x {} px", d.pixel_width, d.pixel_height);
                println!(
                    "  Aspect:   {:.3}:1",
                    d.pixel_height as f64 / d.pixel_width as f64
                );
                println!("  Depth:    {}", member.depth);
            }
            Err(e) => eprintln!("\nNo dimensions for {}: {}", member.path.display(), e),
        }
    }

    fn print_batch_info(&self, pending: &PendingLayout) {
        println!("\n\nBatch layout ({:?}):", pending.plan.mode);
        println!(
            "  Global scale factor: {:.3}",
            pending.plan.global_scale_factor
        );
        let mut total = 0.0;
        for entry in &pending.plan.entries {
            let member = &pending.members[entry.index];
            println!(
                "  {} -> {} cols, ~{:.1} rows",
                abbreviate_path(&member.path, 50),
                entry.render_width_cols,
                entry.estimated_height_rows
            );
            total += entry.estimated_height_rows;
        }
        println!("  Total estimated rows: {:.1}", total);
    }
}

enum DecideOutcome {
    Done,
    Relayout,
    Quit,
}

/// Entry point used by the binary: discover, then review interactively.
pub fn run(config: &AppConfig) -> Result<SessionSummary> {
    let traversal = TraversalConfig {
        roots: config.paths.clone(),
        max_depth: config.depth,
    };
    let candidates: Vec<ImageCandidate> = discover(&traversal).collect();

    if candidates.is_empty() {
        println!(
            "No images found under: {}",
            config
                .paths
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
        return Ok(SessionSummary::default());
    }

    let user_config = UserConfig::load().unwrap_or_else(|e| {
        eprintln!("Warning: failed to load user config: {}", e);
        UserConfig::default()
    });

    let mut session = Session::new(candidates, config, &user_config);
    let summary = session.run()?;

    println!(
        "\nReviewed {} of {} images: {} kept, {} trashed",
        summary.kept + summary.trashed,
        summary.total,
        summary.kept,
        summary.trashed
    );
    Ok(summary)
}
