use chrono::{Datelike, Duration, NaiveDate, Utc, Weekday};
use uuid::Uuid;

use super::expense::{Expense, GENERATED_NOTE};
use super::workspace::Workspace;

const MAX_OCCURRENCES_PER_TEMPLATE: usize = 1024;

/// Counters returned by one materialization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaterializeOutcome {
    pub created: usize,
    pub skipped: usize,
}

/// Shifts weekend dates forward to the following weekday: Sunday moves one
/// day, Saturday two. The shift is applied once and the result is not
/// re-checked.
pub fn next_business_day(date: NaiveDate) -> NaiveDate {
    match date.weekday() {
        Weekday::Sat => date + Duration::days(2),
        Weekday::Sun => date + Duration::days(1),
        _ => date,
    }
}

/// Walks every recurring template in the workspace and creates the concrete
/// occurrences due between the template's start date and the earlier of its
/// end date or `today`. Each candidate payment date is snapped to the next
/// business day first; a snapped date past the template's end date stops
/// that template entirely. Occurrences are inserted through the document's
/// conditional insert, so a (name, payment date) pair is never stored twice
/// and re-running the pass only bumps the skipped counter.
pub fn materialize_recurring_expenses(
    workspace: &mut Workspace,
    today: NaiveDate,
    acting_user: Uuid,
) -> MaterializeOutcome {
    let mut outcome = MaterializeOutcome::default();
    let templates: Vec<Expense> = workspace
        .expenses
        .iter()
        .filter(|expense| expense.recurrence.is_some())
        .cloned()
        .collect();

    for template in &templates {
        let Some(rule) = template.recurrence.as_ref() else {
            continue;
        };
        let window_end = rule.end_date.map_or(today, |end| end.min(today));
        let mut step = rule.start_date;
        let mut guard = 0usize;

        while step <= window_end && guard < MAX_OCCURRENCES_PER_TEMPLATE {
            let candidate = next_business_day(step);
            if rule.end_date.is_some_and(|end| candidate > end) {
                break;
            }
            let occurrence = occurrence_from_template(template, candidate, acting_user);
            if workspace.insert_occurrence_if_absent(occurrence) {
                outcome.created += 1;
            } else {
                outcome.skipped += 1;
            }
            step = rule.frequency.next_date(step);
            guard += 1;
        }
    }

    tracing::debug!(
        templates = templates.len(),
        created = outcome.created,
        skipped = outcome.skipped,
        "materialization pass finished"
    );
    outcome
}

fn occurrence_from_template(template: &Expense, payment_date: NaiveDate, acting_user: Uuid) -> Expense {
    let mut occurrence = template.clone();
    occurrence.id = Uuid::new_v4();
    occurrence.payment_date = payment_date;
    occurrence.recurrence = None;
    occurrence.notes = Some(GENERATED_NOTE.to_string());
    occurrence.created_by = acting_user;
    occurrence.created_at = Utc::now();
    occurrence
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn weekdays_are_left_untouched() {
        for day in 1..=5 {
            let monday_to_friday = date(2024, 1, day);
            assert_eq!(next_business_day(monday_to_friday), monday_to_friday);
        }
    }

    #[test]
    fn saturday_snaps_to_monday() {
        assert_eq!(next_business_day(date(2024, 1, 6)), date(2024, 1, 8));
    }

    #[test]
    fn sunday_snaps_to_monday() {
        assert_eq!(next_business_day(date(2024, 1, 7)), date(2024, 1, 8));
    }
}
