use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use crate::internal_error::InternalResult;
use crate::tasks::repo::StudyData;

pub const DEFAULT_WORK_MINUTES: u32 = 25;
pub const DEFAULT_BREAK_MINUTES: u32 = 5;

const MIN_WORK_MINUTES: u32 = 1;
const MAX_WORK_MINUTES: u32 = 120;
const MIN_BREAK_MINUTES: u32 = 1;
const MAX_BREAK_MINUTES: u32 = 60;

pub const PRESETS: [(&str, u32, u32); 3] = [
    ("classic", 25, 5),
    ("extended", 50, 10),
    ("short", 15, 3),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Work,
    Break,
}

/// What just finished when the countdown hit zero. The caller decides
/// whether it becomes a logged session.
#[derive(Debug, Clone, Copy)]
pub struct CompletedPhase {
    pub duration: u32,
    pub was_break: bool,
}

/// Pure countdown state machine. Scheduling lives in [`run`]; every
/// transition here is a plain function so tests never wait on a clock.
#[derive(Debug)]
pub struct TimerState {
    pub phase: Phase,
    pub running: bool,
    pub remaining_secs: u32,
    pub work_minutes: u32,
    pub break_minutes: u32,
    pub sessions_completed: u32,
}

impl TimerState {
    pub fn new(work_minutes: u32, break_minutes: u32) -> TimerState {
        let work_minutes = work_minutes.clamp(MIN_WORK_MINUTES, MAX_WORK_MINUTES);
        let break_minutes = break_minutes.clamp(MIN_BREAK_MINUTES, MAX_BREAK_MINUTES);

        TimerState {
            phase: Phase::Work,
            running: false,
            remaining_secs: work_minutes * 60,
            work_minutes,
            break_minutes,
            sessions_completed: 0,
        }
    }

    pub fn start(&mut self) {
        if self.running || self.remaining_secs == 0 {
            return;
        }
        self.running = true;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn reset(&mut self) {
        self.running = false;
        self.phase = Phase::Work;
        self.remaining_secs = self.work_minutes * 60;
    }

    /// One elapsed second. At zero the phase flips, the new phase's
    /// duration is loaded, and the finished phase is reported; the
    /// running flag is left alone so the session continues into the
    /// next phase on its own.
    pub fn tick(&mut self) -> Option<CompletedPhase> {
        if !self.running {
            return None;
        }

        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs > 0 {
            return None;
        }

        let completed = CompletedPhase {
            duration: match self.phase {
                Phase::Work => self.work_minutes,
                Phase::Break => self.break_minutes,
            },
            was_break: self.phase == Phase::Break,
        };

        match self.phase {
            Phase::Work => {
                self.sessions_completed += 1;
                self.phase = Phase::Break;
                self.remaining_secs = self.break_minutes * 60;
            }
            Phase::Break => {
                self.phase = Phase::Work;
                self.remaining_secs = self.work_minutes * 60;
            }
        }

        Some(completed)
    }

    /// A new work duration takes effect immediately while in the Work
    /// phase; otherwise it applies on the next reset or phase flip.
    pub fn set_work_minutes(&mut self, minutes: u32) {
        self.work_minutes = minutes.clamp(MIN_WORK_MINUTES, MAX_WORK_MINUTES);
        if self.phase == Phase::Work {
            self.remaining_secs = self.work_minutes * 60;
        }
    }

    pub fn set_break_minutes(&mut self, minutes: u32) {
        self.break_minutes = minutes.clamp(MIN_BREAK_MINUTES, MAX_BREAK_MINUTES);
    }

    pub fn apply_preset(&mut self, work_minutes: u32, break_minutes: u32) {
        self.break_minutes = break_minutes.clamp(MIN_BREAK_MINUTES, MAX_BREAK_MINUTES);
        self.set_work_minutes(work_minutes);
    }

    pub fn phase_total_secs(&self) -> u32 {
        match self.phase {
            Phase::Work => self.work_minutes * 60,
            Phase::Break => self.break_minutes * 60,
        }
    }
}

pub fn format_time(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

enum Command {
    Start,
    Pause,
    Reset,
    Preset(u32, u32),
    Work(u32),
    Break(u32),
    Quit,
    Unknown(String),
}

fn parse_command(line: &str) -> Command {
    let mut words = line.split_whitespace();
    let head = words.next().unwrap_or("");
    let arg = words.next();

    match (head, arg) {
        ("start" | "s", _) => Command::Start,
        ("pause" | "p", _) => Command::Pause,
        ("reset" | "r", _) => Command::Reset,
        ("quit" | "q", _) => Command::Quit,
        ("work", Some(n)) => match n.parse() {
            Ok(minutes) => Command::Work(minutes),
            Err(_) => Command::Unknown(line.to_string()),
        },
        ("break", Some(n)) => match n.parse() {
            Ok(minutes) => Command::Break(minutes),
            Err(_) => Command::Unknown(line.to_string()),
        },
        ("preset", Some(name)) => {
            match PRESETS.iter().find(|(preset, _, _)| *preset == name) {
                Some((_, work, brk)) => Command::Preset(*work, *brk),
                None => Command::Unknown(line.to_string()),
            }
        }
        _ => Command::Unknown(line.to_string()),
    }
}

fn print_status(state: &TimerState) -> InternalResult<()> {
    let phase = match state.phase {
        Phase::Work => "work",
        Phase::Break => "break",
    };
    let running = if state.running { "running" } else { "paused" };
    let total = state.phase_total_secs();
    let elapsed_pct = if total == 0 {
        0
    } else {
        (total - state.remaining_secs) * 100 / total
    };

    print!(
        "\r{} [{} {}%] {}, sessions: {}   ",
        format_time(state.remaining_secs),
        phase,
        elapsed_pct,
        running,
        state.sessions_completed
    );
    io::stdout().flush()?;

    Ok(())
}

/// Interactive countdown loop. Commands arrive on a stdin reader
/// thread; ticking is the 1 s receive timeout, so there is exactly one
/// ticker and pausing or quitting cancels it with no state lost.
pub fn run(
    data: &mut StudyData,
    objective_id: Option<String>,
    work_minutes: u32,
    break_minutes: u32,
) -> InternalResult<()> {
    if let Some(objective_id) = &objective_id {
        if !data.objectives.iter().any(|o| &o.id == objective_id) {
            return Err(format!("unknown objective: {}", objective_id).into());
        }
    }

    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if sender.send(line).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });

    let mut state = TimerState::new(work_minutes, break_minutes);

    println!(
        "commands: start, pause, reset, work <min>, break <min>, preset <classic|extended|short>, quit"
    );
    print_status(&state)?;

    loop {
        match receiver.recv_timeout(Duration::from_secs(1)) {
            Ok(line) => match parse_command(&line) {
                Command::Start => state.start(),
                Command::Pause => state.pause(),
                Command::Reset => state.reset(),
                Command::Preset(work, brk) => state.apply_preset(work, brk),
                Command::Work(minutes) => state.set_work_minutes(minutes),
                Command::Break(minutes) => state.set_break_minutes(minutes),
                Command::Quit => break,
                Command::Unknown(line) => {
                    if !line.trim().is_empty() {
                        println!("\runrecognized command: {}", line.trim());
                    }
                }
            },
            Err(RecvTimeoutError::Timeout) => {
                if let Some(completed) = state.tick() {
                    // Terminal bell; failures don't matter.
                    let _ = write!(io::stdout(), "\x07");

                    if let Some(objective_id) = &objective_id {
                        data.add_session(objective_id, completed.duration, completed.was_break)?;
                    }

                    let next = match state.phase {
                        Phase::Work => "work",
                        Phase::Break => "break",
                    };
                    println!(
                        "\r{} finished, {} starts now",
                        if completed.was_break { "break" } else { "work session" },
                        next
                    );
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }

        print_status(&state)?;
    }

    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn work_expiry_flips_to_break_and_counts_the_session() {
        let mut state = TimerState::new(25, 5);
        state.start();

        let mut completed = None;
        for _ in 0..1500 {
            if let Some(done) = state.tick() {
                completed = Some(done);
            }
        }

        let done = completed.expect("work phase should have expired");
        assert_eq!(done.duration, 25);
        assert!(!done.was_break);
        assert_eq!(state.phase, Phase::Break);
        assert_eq!(state.remaining_secs, 5 * 60);
        assert_eq!(state.sessions_completed, 1);
        // Auto-continue: expiry does not stop the countdown.
        assert!(state.running);
    }

    #[test]
    fn break_expiry_does_not_count_a_session() {
        let mut state = TimerState::new(1, 1);
        state.start();

        for _ in 0..60 {
            state.tick();
        }
        assert_eq!(state.phase, Phase::Break);
        assert_eq!(state.sessions_completed, 1);

        let mut completed = None;
        for _ in 0..60 {
            if let Some(done) = state.tick() {
                completed = Some(done);
            }
        }

        let done = completed.expect("break phase should have expired");
        assert!(done.was_break);
        assert_eq!(done.duration, 1);
        assert_eq!(state.phase, Phase::Work);
        assert_eq!(state.sessions_completed, 1);
    }

    #[test]
    fn preset_while_paused_work_resets_remaining_immediately() {
        let mut state = TimerState::new(25, 5);

        state.apply_preset(50, 10);

        assert_eq!(state.remaining_secs, 3000);
        assert_eq!(state.work_minutes, 50);
        assert_eq!(state.break_minutes, 10);
    }

    #[test]
    fn work_duration_change_during_break_waits_for_phase_flip() {
        let mut state = TimerState::new(1, 5);
        state.start();
        for _ in 0..60 {
            state.tick();
        }
        assert_eq!(state.phase, Phase::Break);

        state.set_work_minutes(50);

        assert_eq!(state.remaining_secs, 5 * 60);

        for _ in 0..(5 * 60) {
            state.tick();
        }
        assert_eq!(state.phase, Phase::Work);
        assert_eq!(state.remaining_secs, 50 * 60);
    }

    #[test]
    fn tick_does_nothing_while_paused() {
        let mut state = TimerState::new(25, 5);

        assert!(state.tick().is_none());
        assert_eq!(state.remaining_secs, 1500);
    }

    #[test]
    fn pause_preserves_remaining_time() {
        let mut state = TimerState::new(25, 5);
        state.start();
        state.tick();
        state.tick();

        state.pause();
        assert_eq!(state.remaining_secs, 1498);

        state.start();
        state.tick();
        assert_eq!(state.remaining_secs, 1497);
    }

    #[test]
    fn reset_returns_to_paused_work_phase() {
        let mut state = TimerState::new(2, 1);
        state.start();
        for _ in 0..120 {
            state.tick();
        }
        assert_eq!(state.phase, Phase::Break);

        state.reset();

        assert_eq!(state.phase, Phase::Work);
        assert!(!state.running);
        assert_eq!(state.remaining_secs, 120);
    }

    #[test]
    fn durations_are_clamped() {
        let mut state = TimerState::new(500, 0);
        assert_eq!(state.work_minutes, 120);
        assert_eq!(state.break_minutes, 1);

        state.set_work_minutes(0);
        assert_eq!(state.work_minutes, 1);
        state.set_break_minutes(90);
        assert_eq!(state.break_minutes, 60);
    }

    #[test]
    fn start_is_a_noop_while_running() {
        let mut state = TimerState::new(25, 5);
        state.start();
        state.tick();
        state.start();

        assert_eq!(state.remaining_secs, 1499);
        assert!(state.running);
    }

    #[test]
    fn format_time_pads_minutes_and_seconds() {
        assert_eq!(format_time(1500), "25:00");
        assert_eq!(format_time(61), "01:01");
        assert_eq!(format_time(0), "00:00");
    }
}
