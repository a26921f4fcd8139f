//! Plain-text rendering of the view models. One full repaint per dirty
//! update cycle; no terminal control beyond line output.

use std::io::{self, Write};

use fundboard_core::{
    group_failures, AppViewModel, Focus, JobStatus, ResultsViewModel, RowView,
    ScrapeViewModel, SortMode,
};

const DASH: &str = "—";

pub(crate) fn render(view: &AppViewModel) {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let _ = write_view(&mut out, view);
}

fn write_view(out: &mut impl Write, view: &AppViewModel) -> io::Result<()> {
    writeln!(out)?;
    write_results(out, &view.results)?;
    write_scrape(out, &view.scrape)?;
    if view.results.focus == Focus::Search {
        write!(out, "search> ")?;
        out.flush()?;
    }
    Ok(())
}

fn write_results(out: &mut impl Write, results: &ResultsViewModel) -> io::Result<()> {
    let mut headline = format!(
        "== Results · {} shown · sort: {}",
        results.metrics.total,
        sort_label(results.sort)
    );
    for (label, count) in &results.metrics.counts {
        if *count > 0 {
            headline.push_str(&format!(" · {label} {count}"));
        }
    }
    if results.loading {
        headline.push_str(" · loading…");
    }
    writeln!(out, "{headline}")?;

    if let Some(error) = &results.error {
        writeln!(out, "!! fetch failed: {error}")?;
    }
    if !results.search.trim().is_empty() {
        writeln!(out, "   search: {:?}", results.search.trim())?;
    }

    for (number, row) in results.rows.iter().enumerate() {
        write_row(out, number + 1, row, results.show_evidence)?;
    }
    if results.rows.is_empty() && results.error.is_none() {
        writeln!(out, "   (no matching results)")?;
    }
    Ok(())
}

fn write_row(
    out: &mut impl Write,
    number: usize,
    row: &RowView,
    show_evidence: bool,
) -> io::Result<()> {
    let cursor = if row.selected { '>' } else { ' ' };
    let pin = if row.pinned { '*' } else { ' ' };
    writeln!(
        out,
        "{cursor}{pin}{number:>3}  {:<34} {:<17} {:<8} {:<14} {}",
        clip(row.fund_name.as_deref().unwrap_or(DASH), 34),
        clip(row.eligibility.as_deref().unwrap_or(DASH), 17),
        clip(row.application_status.as_deref().unwrap_or(DASH), 8),
        clip(row.deadline.as_deref().unwrap_or(DASH), 14),
        clip(row.funding_range.as_deref().unwrap_or(DASH), 24),
    )?;
    if !row.expanded {
        return Ok(());
    }

    let detail = [
        ("url", &row.fund_url),
        ("scope", &row.geographic_scope),
        ("applicants", &row.applicant_types),
        ("beneficiaries", &row.beneficiary_focus),
        ("restrictions", &row.restrictions),
        ("notes", &row.notes),
    ];
    for (label, value) in detail {
        if let Some(text) = value {
            writeln!(out, "      {label}: {}", clip(text, 100))?;
        }
    }
    if show_evidence {
        if let Some(evidence) = &row.evidence {
            writeln!(out, "      evidence: {}", clip(evidence, 200))?;
        }
    }
    if let Some(error) = &row.error {
        if !error.trim().is_empty() {
            writeln!(out, "      error: {}", clip(error, 100))?;
        }
    }
    Ok(())
}

fn write_scrape(out: &mut impl Write, scrape: &ScrapeViewModel) -> io::Result<()> {
    if let Some(error) = &scrape.error {
        writeln!(out, "!! scrape: {error}")?;
    }

    if !scrape.queue.is_empty() {
        writeln!(
            out,
            "== Queue · {} staged · {} distinct hosts",
            scrape.stats.total, scrape.stats.distinct_hosts
        )?;
        for url in &scrape.queue {
            let mark = if scrape.rescrape.contains(url) {
                " [rescrape]"
            } else {
                ""
            };
            writeln!(out, "   {url}{mark}")?;
        }
        if let Some(prep) = &scrape.prep {
            writeln!(
                out,
                "   prepare: {} new · {} already processed · {} duplicates",
                prep.to_scrape.len(),
                prep.already_processed.len(),
                prep.duplicates_in_payload.len()
            )?;
            for url in &prep.already_processed {
                writeln!(out, "     seen before: {url} (rescrape {url} to re-queue)")?;
            }
        }
    }

    if let Some(job) = &scrape.job {
        write_job(out, job)?;
    }
    Ok(())
}

fn write_job(out: &mut impl Write, job: &JobStatus) -> io::Result<()> {
    let state = if job.done { "done" } else { "running" };
    writeln!(
        out,
        "== Job {} · {state} · {}% · {}/{} urls · {}s elapsed",
        job.job_id,
        job.progress_percent,
        job.completed_urls,
        job.total_urls,
        job.total_elapsed_seconds
    )?;
    if let Some(current) = &job.current_url {
        writeln!(
            out,
            "   scraping {current} ({}s)",
            job.current_elapsed_seconds
        )?;
    }
    for (group, failures) in group_failures(&job.errors) {
        writeln!(out, "   {} errors ({}):", group.label(), failures.len())?;
        for failure in failures {
            writeln!(out, "     {} — {}", failure.url, clip(&failure.message, 80))?;
        }
    }
    Ok(())
}

fn sort_label(sort: SortMode) -> &'static str {
    match sort {
        SortMode::Recent => "recent",
        SortMode::Alphabetical => "alphabetical",
        SortMode::Eligibility => "eligibility",
    }
}

fn clip(text: &str, max: usize) -> String {
    let mut count = 0;
    for (offset, _) in text.char_indices() {
        if count == max {
            let mut clipped = text[..offset].to_string();
            clipped.push('…');
            return clipped;
        }
        count += 1;
    }
    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::clip;

    #[test]
    fn clip_respects_char_boundaries() {
        assert_eq!(clip("short", 10), "short");
        assert_eq!(clip("£10k–£50k", 4), "£10k…");
        assert_eq!(clip("abcdef", 3), "abc…");
    }
}
