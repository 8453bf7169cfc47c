// Text rendering of boards and turn overviews, shared by the sinks

use colored::{Color, Colorize};
use std::fmt::Write as _;
use std::time::Duration;

use crate::board::Board;
use crate::bot::TurnReport;
use crate::rules::{COLLISION, MAX_PLAYERS};
use crate::types::{Action, Direction};

/// Order in which actions are listed in overviews
const OVERVIEW_ORDER: [Action; 5] = [
    Action::ChangeNothing,
    Action::SlowDown,
    Action::SpeedUp,
    Action::TurnLeft,
    Action::TurnRight,
];

fn player_colour(id: i8) -> Color {
    match id {
        1 => Color::Red,
        2 => Color::Green,
        3 => Color::Yellow,
        4 => Color::Blue,
        5 => Color::Magenta,
        6 => Color::Cyan,
        _ => Color::White,
    }
}

fn head_glyph(direction: Direction, own: bool) -> char {
    match (direction, own) {
        (Direction::Up, false) => '⮝',
        (Direction::Up, true) => '⮉',
        (Direction::Right, false) => '⮞',
        (Direction::Right, true) => '⮊',
        (Direction::Down, false) => '⮟',
        (Direction::Down, true) => '⮋',
        (Direction::Left, false) => '⮜',
        (Direction::Left, true) => '⮈',
    }
}

fn glyph(board: &Board, x: i32, y: i32) -> char {
    let v = board.cell(x, y);
    if v == 0 {
        return '·';
    }
    if v == COLLISION {
        return '×';
    }
    let own = v as u8 == board.you;
    match board.player(v as u8) {
        Some(p) if p.x == x && p.y == y => head_glyph(p.direction, own),
        _ if own => '●',
        _ => char::from(b'0' + v as u8),
    }
}

/// Renders the cells, one line per row; with `colour` set every tail is
/// painted in its player's colour
pub fn render_board(board: &Board, colour: bool) -> String {
    let mut out = String::with_capacity(((board.width() + 1) * board.height()) as usize * 3);
    for y in 0..board.height() {
        for x in 0..board.width() {
            let g = glyph(board, x, y);
            let v = board.cell(x, y);
            if colour && v > 0 {
                let _ = write!(out, "{}", g.to_string().color(player_colour(v)));
            } else {
                out.push(g);
            }
        }
        if y < board.height() - 1 {
            out.push('\n');
        }
    }
    out
}

/// `alive: [ >1< 2 _ ]`, the self-player in angle brackets
pub fn alive_line(board: &Board) -> String {
    let mut out = String::from("alive: [ ");
    for id in 1..=MAX_PLAYERS {
        let Some(p) = board.player(id) else {
            break;
        };
        let mark = if p.active { char::from(b'0' + id) } else { '_' };
        if id == board.you {
            let _ = write!(out, ">{}< ", mark);
        } else {
            let _ = write!(out, "{} ", mark);
        }
    }
    out.push(']');
    out
}

/// State shown by an overview
pub struct Overview<'a> {
    pub board: &'a Board,
    pub round: u32,
    pub alive: bool,
    pub report: Option<&'a TurnReport>,
    pub jumps: u32,
    pub runtime: Duration,
}

fn rate(part: u64, run: u64) -> f64 {
    if run == 0 {
        0.0
    } else {
        part as f64 / run as f64
    }
}

/// Overview lines of one turn; `detailed` adds the opponent average and
/// the survival quartiles per action
pub fn overview_lines(o: &Overview<'_>, detailed: bool) -> Vec<String> {
    let mut lines = vec![
        format!("game state {}", o.round),
        alive_line(o.board),
        format!("alive: {}", o.alive),
        format!("size: {} x {}", o.board.width(), o.board.height()),
        format!("usage: {:.2}", 1.0 - o.board.usage(0)),
        format!("runtime: {}s", o.runtime.as_secs()),
    ];

    let Some(report) = o.report.filter(|_| o.alive) else {
        return lines;
    };

    lines.push(String::new());
    if let Some(me) = o.board.me() {
        lines.push(format!("speed: {}", me.speed));
    }
    lines.push(format!("jumps: {}", o.jumps));
    lines.push(String::new());

    for action in OVERVIEW_ORDER {
        let s = report.stats.get(action);
        lines.push(format!("{}:", action));
        lines.push(format!("   win chance: {:.2}", s.win_rate()));
        lines.push(format!("   run: {}", s.run));
        lines.push(format!("   won: {}", s.won));
        lines.push(format!("   survived: {}", s.survived));
        lines.push(format!("   round: {}", s.rounds));
        lines.push(format!("   average length: {:.1}", s.mean_survival()));
        if detailed {
            lines.push(format!(
                "   average length best opponent: {:.1}",
                rate(s.survived_opponent, s.run)
            ));
            let labels = ["1st quantile", "median", "3rd quantile"];
            match s.quartiles() {
                Some(values) => {
                    for (label, value) in labels.iter().zip(values) {
                        lines.push(format!("   {} length: {}", label, value));
                    }
                }
                None => {
                    for label in labels {
                        lines.push(format!("   {} length not available", label));
                    }
                }
            }
        }
    }

    let name = |a: Option<Action>| a.map_or(String::new(), |a| a.to_string());
    lines.push(format!(
        "longest win: {} {}",
        report.stats.longest_win,
        name(report.stats.longest_win_action)
    ));
    lines.push(format!("longest: {} {}", report.stats.longest, name(report.stats.longest_action)));
    lines.push(String::new());
    lines.push(format!("selected: {}", report.decision.action));
    lines.push(format!("reason: {}", report.decision.reason));
    lines
}

/// One-line game result: `Win!` or `Loss! (<survived> / <rounds>)`
pub fn result_line(won: bool, last_alive: u32, rounds: u32) -> String {
    if won {
        "Win!".to_string()
    } else {
        format!("Loss! ({} / {})", last_alive, rounds)
    }
}
