use rentwise_core::domain::analysis::Analysis;
use rentwise_core::domain::profile::ProfileField;
use rentwise_core::llm::prompt::DISCLAIMER;
use rentwise_core::session::Session;
use std::fmt::Write;

pub const HELP: &str = "\
Commands:
  income <amount>     monthly take-home pay
  debt <amount>       monthly debt payments (loans/cards)
  expenses <amount>   other fixed expenses (groceries, phone, ...)
  savings <amount>    monthly savings goal
  profile             show the current figures
  analyze             get rent recommendations
  help                show this message
  quit                leave";

pub fn banner(market: &str) -> String {
    format!(
        "Rentwise - smart rent affordability for {market}\n\
Enter your monthly figures to see what you can afford."
    )
}

/// Formats dollars with thousands separators and at most two decimals.
pub fn money(amount: f64) -> String {
    let fixed = format!("{amount:.2}");
    let (digits, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac.trim_end_matches('0') {
        "" => format!("${grouped}"),
        f => format!("${grouped}.{f}"),
    }
}

/// Whole percentages print bare, anything else with one decimal.
pub fn percent(value: f64) -> String {
    let tenths = format!("{value:.1}");
    match tenths.strip_suffix(".0") {
        Some(whole) => format!("{whole}%"),
        None => format!("{tenths}%"),
    }
}

pub fn profile(session: &Session) -> String {
    let p = session.collector().profile();
    let mut out = String::from("Your Financial Profile\n");
    for field in ProfileField::ALL {
        let _ = writeln!(out, "  {:<28} {}", field.label(), money(p.get(field)));
    }
    let status = if session.is_busy() {
        "analysis in progress"
    } else if session.can_submit() {
        "ready - type `analyze`"
    } else {
        "enter your take-home pay to continue"
    };
    let _ = write!(out, "  Status: {status}");
    out
}

pub fn submit_unavailable(session: &Session) -> &'static str {
    if session.is_busy() {
        "An analysis is already running; please wait for it to finish."
    } else {
        "Enter your monthly take-home pay first (e.g. `income 4000`)."
    }
}

pub fn outcome(session: &Session) -> String {
    match (session.error(), session.analysis()) {
        (Some(error), _) => format!("! {error}"),
        (None, Some(analysis)) => analysis_view(analysis),
        (None, None) => String::new(),
    }
}

pub fn analysis_view(analysis: &Analysis) -> String {
    let r = &analysis.result;
    let mut out = String::new();

    let _ = writeln!(out, "== Rentwise Summary ==\n{}\n", r.summary);

    for rec in &r.recommendations {
        let _ = writeln!(
            out,
            "[{}] {} - {}/mo\n  {}\n  Risk: {} ({})\n",
            rec.tier,
            percent(rec.percentage),
            money(rec.amount),
            rec.description,
            rec.risk_level,
            rec.risk_level.verdict(),
        );
    }

    let _ = writeln!(out, "== {} Context ==\n{}\n", analysis.market, r.local_context);

    if !r.action_items.is_empty() {
        let _ = writeln!(out, "== Recommendations ==");
        for (i, item) in r.action_items.iter().enumerate() {
            let _ = writeln!(out, "  {}. {item}", i + 1);
        }
        out.push('\n');
    }

    let _ = writeln!(out, "== Budget Impact Snapshot ==\n{}\n", r.budget_snapshot);

    if !r.follow_up_questions.is_empty() {
        let _ = writeln!(out, "== Next Steps / Follow-up ==");
        for q in &r.follow_up_questions {
            let _ = writeln!(out, "  - {q}");
        }
        out.push('\n');
    }

    let _ = write!(
        out,
        "\"{DISCLAIMER}\"\n(generated {} via {})",
        analysis.generated_at.format("%Y-%m-%d %H:%M UTC"),
        analysis.provider
    );
    out
}
