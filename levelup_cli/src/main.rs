use chrono::{Local, NaiveDateTime, NaiveTime, Utc};
use clap::{Parser, Subcommand};
use levelup_core::history::{active_days, last_of_kind};
use levelup_core::streak::current_streak;
use levelup_core::*;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};

#[derive(Parser)]
#[command(name = "levelup")]
#[command(about = "Gamified workout and habit tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a workout session (default), or work with the exercise checklist
    Workout {
        #[command(subcommand)]
        action: Option<WorkoutAction>,

        /// Workout plan TOML file (defaults to the built-in plan)
        #[arg(long)]
        plan: Option<PathBuf>,

        /// Auto-complete (for testing) - run every set without waiting
        #[arg(long)]
        auto: bool,

        /// Dry run - show the plan without starting a session
        #[arg(long)]
        dry_run: bool,
    },

    /// Record the morning wake-up check-in
    Checkin {
        /// Check-in time in local time, YYYY-MM-DDTHH:MM:SS (defaults to now)
        #[arg(long)]
        at: Option<String>,
    },

    /// Run the focus timer
    Focus {
        /// Number of phases to run
        #[arg(long, default_value_t = 1)]
        phases: usize,

        /// Auto-complete (for testing) - finish phases without waiting
        #[arg(long)]
        auto: bool,
    },

    /// Manage daily tasks
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },

    /// Show level, XP and streak
    Stats,

    /// Show the daily timetable and what is scheduled now
    Today {
        /// Local time as HH:MM (defaults to now)
        #[arg(long)]
        at: Option<String>,
    },

    /// Roll up the activity log to CSV
    Rollup {
        /// Clean up processed log files after rollup
        #[arg(long)]
        cleanup: bool,
    },
}

#[derive(Subcommand)]
enum WorkoutAction {
    /// Show the exercise checklist and today's progress
    List,
    /// Mark an exercise done, or undo it
    Toggle { id: String },
    /// Show how to perform an exercise
    Show { id: String },
}

#[derive(Subcommand)]
enum TaskAction {
    /// Add a task to the top of the list
    Add { title: String },
    /// List tasks
    List,
    /// Toggle a task's completion by its list number
    Done { number: usize },
    /// Remove a task by its list number
    Remove { number: usize },
}

/// On-disk layout under the data directory
struct Paths {
    state: PathBuf,
    log_dir: PathBuf,
    log: PathBuf,
    csv: PathBuf,
}

impl Paths {
    fn new(data_dir: &Path) -> Self {
        let log_dir = data_dir.join("log");
        Self {
            state: data_dir.join("state.json"),
            log: log_dir.join("activity.log"),
            log_dir,
            csv: data_dir.join("activity.csv"),
        }
    }
}

fn main() -> Result<()> {
    levelup_core::logging::init_with_level("warn");

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    std::fs::create_dir_all(&data_dir)?;
    let paths = Paths::new(&data_dir);

    match cli.command {
        Some(Commands::Workout {
            action: Some(action),
            plan,
            ..
        }) => cmd_checklist(&paths, action, plan, &config),
        Some(Commands::Workout {
            action: None,
            plan,
            auto,
            dry_run,
        }) => cmd_workout(&paths, plan, auto, dry_run, &config),
        Some(Commands::Checkin { at }) => cmd_checkin(&paths, at, &config),
        Some(Commands::Focus { phases, auto }) => cmd_focus(&paths, phases, auto, &config),
        Some(Commands::Task { action }) => cmd_task(&paths, action, &config),
        Some(Commands::Stats) => cmd_stats(&paths),
        Some(Commands::Today { at }) => cmd_today(at, &config),
        Some(Commands::Rollup { cleanup }) => cmd_rollup(&paths, cleanup),
        None => cmd_workout(&paths, None, false, false, &config),
    }
}

// ── workout ──────────────────────────────────────────────────────────

fn cmd_workout(
    paths: &Paths,
    plan_path: Option<PathBuf>,
    auto: bool,
    dry_run: bool,
    config: &Config,
) -> Result<()> {
    let plan = load_plan(plan_path)?;
    display_plan(&plan);

    if dry_run {
        println!("\n[Dry run - not starting session]");
        return Ok(());
    }

    let store = JsonFileStore::new(&paths.state);
    let outcome = if auto {
        let engine = SessionEngine::start(plan, config.session, InstantClock::new(), store)?;
        run_auto(engine)?
    } else {
        let engine = SessionEngine::start(plan, config.session, SystemClock::new(), store)?;
        run_interactive(engine, &Input::spawn())?
    };

    let Some(mut completion) = outcome else {
        return Ok(());
    };

    let summary = &completion.summary;
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  SESSION COMPLETE");
    println!("╰─────────────────────────────────────────╯");
    println!("  Sets completed: {}", summary.completed_set_count);
    println!("  XP gained:      +{}", summary.xp_awarded);
    println!("  Level {} ({} XP)", summary.new_level, summary.new_xp);

    let mut entry = ActivityEntry::new(ActivityKind::Workout, Utc::now());
    entry.xp_awarded = summary.xp_awarded;
    entry.completed_sets = Some(summary.completed_set_count);
    JsonlSink::new(&paths.log).append(&entry)?;

    if let Some(err) = completion.persistence_error.take() {
        eprintln!("\n⚠ Progress could not be saved: {}", err);
        return Err(err);
    }

    println!("\n✓ Workout logged!");
    Ok(())
}

fn load_plan(plan_path: Option<PathBuf>) -> Result<WorkoutPlan> {
    let plan = match plan_path {
        Some(path) => WorkoutPlan::load_from(&path)?,
        None => default_plan().clone(),
    };

    let errors = plan.validate();
    if !errors.is_empty() {
        eprintln!("Workout plan validation errors:");
        for error in &errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::Configuration(errors.join("; ")));
    }
    Ok(plan)
}

/// Drive a session to completion without user input
fn run_auto<C: Clock, S: ProgressStore>(
    mut engine: SessionEngine<C, S>,
) -> Result<Option<Completion>> {
    loop {
        let phase = engine.state().phase;
        let completion = match phase {
            Phase::Done => return Ok(None),
            Phase::Work if engine.awaiting_manual_completion() => {
                engine.complete_set_manually()?
            }
            Phase::Work if !engine.state().is_running => {
                engine.toggle_run()?;
                engine.run_until_idle(|_| {})
            }
            _ => engine.run_until_idle(|_| {}),
        };
        if completion.is_some() {
            return Ok(completion);
        }
    }
}

/// Keyboard-driven session
///
/// Reps sets wait for Enter. Timed phases count down on the clock while
/// input is polled between ticks, so Enter pauses or resumes, `s` skips the
/// set and `q` quits (after confirmation) at any point. Closing stdin
/// abandons the session.
fn run_interactive<C: Clock, S: ProgressStore>(
    mut engine: SessionEngine<C, S>,
    input: &Input,
) -> Result<Option<Completion>> {
    let mut shown = None;

    loop {
        let state = engine.snapshot();
        if state.phase == Phase::Done {
            return Ok(None);
        }

        let position = (state.exercise_index, state.current_set, state.phase);
        if shown != Some(position) {
            match state.phase {
                Phase::Work => display_work(&engine),
                Phase::Rest => display_rest(&engine),
                Phase::Done => {}
            }
            display_controls(&engine);
            shown = Some(position);
        }

        let line = if state.is_running {
            match input.rx.try_recv() {
                Ok(line) => line,
                Err(TryRecvError::Empty) => {
                    let completion = engine.tick_from_clock();
                    if completion.is_some() {
                        println!();
                        return Ok(completion);
                    }
                    let now = engine.state();
                    if now.is_running {
                        print!("\r  {} {:>4}s ", now.phase, now.remaining_seconds);
                        io::stdout().flush()?;
                    } else {
                        println!();
                    }
                    continue;
                }
                Err(TryRecvError::Disconnected) => return Ok(abandon(engine)),
            }
        } else {
            match input.rx.recv() {
                Ok(line) => line,
                Err(_) => return Ok(abandon(engine)),
            }
        };

        match line.as_str() {
            "q" => {
                // Hold the countdown while the user decides
                let was_running = engine.state().is_running;
                if was_running {
                    engine.toggle_run()?;
                }
                print!("\nQuit now? Progress from this session will be lost [y/N] ");
                io::stdout().flush()?;
                match input.rx.recv() {
                    Ok(answer) if answer != "y" => {
                        if was_running {
                            engine.toggle_run()?;
                        }
                        shown = None;
                    }
                    _ => return Ok(abandon(engine)),
                }
            }
            "s" => match engine.skip() {
                Ok(None) => println!("\n  Set skipped."),
                Ok(completion) => return Ok(completion),
                Err(e @ Error::InvalidAction { .. }) => println!("\n  {}", e),
                Err(e) => return Err(e),
            },
            _ if engine.awaiting_manual_completion() => {
                if let Some(completion) = engine.complete_set_manually()? {
                    return Ok(Some(completion));
                }
            }
            _ => {
                engine.toggle_run()?;
                if !engine.state().is_running {
                    println!("\n  Paused - Enter to resume");
                }
            }
        }
    }
}

/// Give up on the session without rewards
fn abandon<C: Clock, S: ProgressStore>(engine: SessionEngine<C, S>) -> Option<Completion> {
    let report = engine.exit();
    println!(
        "\nSession ended early after {} sets. No XP awarded.",
        report.state.completed_set_count
    );
    None
}

/// Trimmed, lowercased stdin lines fed from a reader thread
struct Input {
    rx: Receiver<String>,
}

impl Input {
    fn spawn() -> Self {
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else {
                    break;
                };
                if tx.send(line.trim().to_lowercase()).is_err() {
                    break;
                }
            }
        });
        Self { rx }
    }
}

fn display_plan(plan: &WorkoutPlan) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  WORKOUT PLAN");
    println!("╰─────────────────────────────────────────╯");
    println!();
    for (i, exercise) in plan.iter().enumerate() {
        println!(
            "  {:>2}. {:<28} {} x {}",
            i + 1,
            exercise.name,
            exercise.set_count,
            exercise.target_label()
        );
    }
    println!();
    println!("  {} exercises, {} sets", plan.len(), plan.total_sets());
}

fn display_work<C: Clock, S: ProgressStore>(engine: &SessionEngine<C, S>) {
    let state = engine.state();
    let Some(exercise) = engine.current_exercise() else {
        return;
    };
    println!("\n─────────────────────────────────────────");
    println!(
        "  [{}/{}] {}",
        state.exercise_index + 1,
        engine.plan().len(),
        exercise.name
    );
    println!(
        "  Set {} of {}: {}",
        state.current_set,
        exercise.set_count,
        exercise.target_label()
    );
}

fn display_rest<C: Clock, S: ProgressStore>(engine: &SessionEngine<C, S>) {
    let label = match engine.rest_kind() {
        Some(RestKind::InterExercise) => "Rest",
        Some(RestKind::Skip) => "Short rest",
        _ => "Rest between sets",
    };
    print!("\n  {}", label);
    if let Some(next) = engine.upcoming_exercise() {
        print!(" - up next: {}", next.name);
    }
    println!();
}

fn display_controls<C: Clock, S: ProgressStore>(engine: &SessionEngine<C, S>) {
    let state = engine.state();
    let enter = if engine.awaiting_manual_completion() {
        "Enter when the set is done"
    } else if state.is_running {
        "Enter to pause"
    } else {
        "Enter to start the timer"
    };
    if state.phase == Phase::Work {
        println!("  {} | 's' to skip | 'q' to quit", enter);
    } else {
        println!("  {} | 'q' to quit", enter);
    }
}

// ── checklist ────────────────────────────────────────────────────────

fn cmd_checklist(
    paths: &Paths,
    action: WorkoutAction,
    plan_path: Option<PathBuf>,
    config: &Config,
) -> Result<()> {
    let plan = load_plan(plan_path)?;
    let xp_per_check = config.session.xp_per_check;

    match action {
        WorkoutAction::List => {
            let mut state = ProfileState::load(&paths.state)?;
            let list = Checklist::new(&plan, &mut state.completed_exercise_ids, xp_per_check);
            for exercise in plan.iter() {
                let mark = if list.is_done(&exercise.id) { "x" } else { " " };
                println!(
                    "  [{}] {:<14} {:<20} {} x {}",
                    mark,
                    exercise.id,
                    exercise.name,
                    exercise.set_count,
                    exercise.target_label()
                );
            }
            println!(
                "\n  Progress: {}/{} ({}%)",
                list.done_count(),
                plan.len(),
                list.progress_percent()
            );
        }
        WorkoutAction::Toggle { id } => {
            let (toggle, percent) = ProfileState::update(&paths.state, |state| {
                let mut stats = state.stats;
                let mut list =
                    Checklist::new(&plan, &mut state.completed_exercise_ids, xp_per_check);
                let toggle = list.toggle(&id, &mut stats)?;
                let percent = list.progress_percent();
                state.stats = stats;
                Ok((toggle, percent))
            })?;

            let name = plan.find(&id).map_or(id.as_str(), |e| e.name.as_str());
            if toggle.completed {
                let mut entry = ActivityEntry::new(ActivityKind::Workout, Utc::now());
                entry.xp_awarded = xp_per_check;
                entry.detail = Some(name.to_string());
                JsonlSink::new(&paths.log).append(&entry)?;
                println!("✓ {} done ({:+} XP)", name, toggle.xp_delta);
            } else {
                println!("Undone: {} ({:+} XP)", name, toggle.xp_delta);
            }
            println!("  Progress: {}%", percent);
        }
        WorkoutAction::Show { id } => {
            let exercise = plan
                .find(&id)
                .ok_or_else(|| Error::Other(format!("No exercise with id '{}' in the plan", id)))?;
            println!("\n  {} ({} x {})", exercise.name, exercise.set_count, exercise.target_label());
            if let Some(description) = &exercise.description {
                println!("\n  {}", description);
            }
            if !exercise.steps.is_empty() {
                println!("\n  How to:");
                for (i, step) in exercise.steps.iter().enumerate() {
                    println!("    {}. {}", i + 1, step);
                }
            }
            if let Some(tips) = &exercise.tips {
                println!("\n  Tip: {}", tips);
            }
        }
    }

    Ok(())
}

// ── check-in ─────────────────────────────────────────────────────────

fn cmd_checkin(paths: &Paths, at: Option<String>, config: &Config) -> Result<()> {
    let now = match at {
        Some(s) => NaiveDateTime::parse_from_str(&s, "%Y-%m-%dT%H:%M:%S")
            .map_err(|e| Error::Other(format!("Invalid --at time '{}': {}", s, e)))?,
        None => Local::now().naive_local(),
    };

    let outcome = ProfileState::update(&paths.state, |state| {
        Ok(record_check_in(&mut state.streak, now, &config.check_in))
    })?;

    match outcome {
        CheckInOutcome::Recorded { streak } => {
            let mut entry = ActivityEntry::new(ActivityKind::CheckIn, Utc::now());
            entry.detail = Some(format!("streak {}", streak));
            JsonlSink::new(&paths.log).append(&entry)?;
            println!("✓ Early bird bonus acquired. Streak: {} days.", streak);
        }
        CheckInOutcome::AlreadyCheckedIn { streak } => {
            println!("You already checked in today. Streak: {} days.", streak);
        }
        CheckInOutcome::OutsideWindow => {
            println!(
                "Too late. Check-ins count between {:02}:00 and {:02}:00.",
                config.check_in.start_hour, config.check_in.end_hour
            );
        }
    }

    Ok(())
}

// ── focus ────────────────────────────────────────────────────────────

fn cmd_focus(paths: &Paths, phases: usize, auto: bool, config: &Config) -> Result<()> {
    let mut timer = FocusTimer::new(&config.focus)?;

    if auto {
        run_focus(paths, &mut timer, phases, InstantClock::new())
    } else {
        run_focus(paths, &mut timer, phases, SystemClock::new())
    }
}

fn run_focus<C: Clock>(
    paths: &Paths,
    timer: &mut FocusTimer,
    phases: usize,
    mut clock: C,
) -> Result<()> {
    let mut sink = JsonlSink::new(&paths.log);

    for _ in 0..phases {
        let phase = timer.phase().clone();
        println!("\n▶ {} ({} min)", phase.name, phase.minutes);

        timer.toggle();
        clock.subscribe();
        while clock.wait_tick() {
            if let Some(finished) = timer.tick() {
                clock.cancel();
                println!("\r✓ {} complete        ", finished.name);

                let mut entry = ActivityEntry::new(ActivityKind::Focus, Utc::now());
                entry.detail = Some(finished.name.clone());
                sink.append(&entry)?;
                break;
            }
            let secs = timer.seconds_left();
            print!("\r  {:02}:{:02} ", secs / 60, secs % 60);
            io::stdout().flush()?;
        }
    }

    Ok(())
}

// ── tasks ────────────────────────────────────────────────────────────

fn cmd_task(paths: &Paths, action: TaskAction, config: &Config) -> Result<()> {
    let xp_per_task = config.tasks.xp_per_task;

    match action {
        TaskAction::Add { title } => {
            let title = ProfileState::update(&paths.state, |state| {
                let mut list = TaskList::new(&mut state.tasks, xp_per_task);
                Ok(list.add(&title)?.title.clone())
            })?;
            println!("✓ Added: {}", title);
        }
        TaskAction::List => {
            let state = ProfileState::load(&paths.state)?;
            if state.tasks.is_empty() {
                println!("No tasks yet.");
            }
            for (i, task) in state.tasks.iter().enumerate() {
                let mark = if task.completed { "x" } else { " " };
                println!("  {:>2}. [{}] {} ({})", i + 1, mark, task.title, task.goal);
            }
        }
        TaskAction::Done { number } => {
            let (toggle, title) = ProfileState::update(&paths.state, |state| {
                let index = task_index(number)?;
                let mut stats = state.stats;
                let mut list = TaskList::new(&mut state.tasks, xp_per_task);
                let toggle = list.toggle(index, &mut stats)?;
                let title = list.tasks()[index].title.clone();
                state.stats = stats;
                Ok((toggle, title))
            })?;

            if toggle.completed {
                let mut entry = ActivityEntry::new(ActivityKind::Task, Utc::now());
                entry.xp_awarded = toggle.xp_awarded;
                entry.detail = Some(title.clone());
                JsonlSink::new(&paths.log).append(&entry)?;
                println!("✓ {} (+{} XP)", title, toggle.xp_awarded);
            } else {
                println!("Reopened: {}", title);
            }
        }
        TaskAction::Remove { number } => {
            let removed = ProfileState::update(&paths.state, |state| {
                let index = task_index(number)?;
                TaskList::new(&mut state.tasks, xp_per_task).remove(index)
            })?;
            println!("✓ Removed: {}", removed.title);
        }
    }

    Ok(())
}

fn task_index(number: usize) -> Result<usize> {
    number
        .checked_sub(1)
        .ok_or_else(|| Error::Other("Task numbers start at 1".into()))
}

// ── stats / rollup ───────────────────────────────────────────────────

fn cmd_stats(paths: &Paths) -> Result<()> {
    let state = ProfileState::load(&paths.state)?;
    let today = Local::now().date_naive();
    let recent = load_recent_entries(&paths.log, &paths.csv, 7)?;
    let active = active_days(&recent);

    println!("  Level:   {}", state.stats.level);
    println!("  XP:      {} / {}", state.stats.xp, XP_PER_LEVEL);
    println!("  Streak:  {}d", current_streak(&state.streak, today));
    println!(
        "  Tasks:   {}/{} done",
        state.tasks.iter().filter(|t| t.completed).count(),
        state.tasks.len()
    );
    println!(
        "  Exercises completed: {}",
        state.completed_exercise_ids.len()
    );

    let week: String = (0..7)
        .rev()
        .filter_map(|days_ago| today.checked_sub_days(chrono::Days::new(days_ago)))
        .map(|day| if active.contains(&day) { '■' } else { '□' })
        .collect();
    println!("  Last 7 days: {}", week);

    match last_of_kind(&recent, ActivityKind::Workout) {
        Some(entry) => println!(
            "  Last workout: {} (+{} XP)",
            entry.recorded_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            entry.xp_awarded
        ),
        None => println!("  Last workout: none this week"),
    }

    Ok(())
}

fn cmd_today(at: Option<String>, config: &Config) -> Result<()> {
    let now = match at {
        Some(s) => NaiveTime::parse_from_str(&s, "%H:%M")
            .map_err(|e| Error::Other(format!("Invalid --at time '{}': {}", s, e)))?,
        None => Local::now().time(),
    };

    let active = active_slot(&config.timetable, now);
    match active {
        Some(slot) => println!("Now ({}): {}", now.format("%H:%M"), slot.label),
        None => println!("Now ({}): nothing scheduled", now.format("%H:%M")),
    }
    println!();
    for slot in &config.timetable {
        let marker = if active == Some(slot) { "▶" } else { " " };
        println!(
            "  {} {}-{}  {}",
            marker,
            slot.start.format("%H:%M"),
            slot.end.format("%H:%M"),
            slot.label
        );
    }

    Ok(())
}

fn cmd_rollup(paths: &Paths, cleanup: bool) -> Result<()> {
    if !paths.log.exists() {
        println!("No activity log found - nothing to roll up.");
        return Ok(());
    }

    let count = levelup_core::rollup::log_to_csv_and_archive(&paths.log, &paths.csv)?;

    println!("✓ Rolled up {} entries to CSV", count);
    println!("  CSV: {}", paths.csv.display());

    if cleanup {
        let cleaned = levelup_core::rollup::cleanup_processed_logs(&paths.log_dir)?;
        if cleaned > 0 {
            println!("✓ Cleaned up {} processed log files", cleaned);
        }
    }

    Ok(())
}
