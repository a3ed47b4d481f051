use crate::records::{BusinessRecord, HarvestReport};
use anyhow::Result;
use askama::Template;
use chrono::Utc;
use csv::Writer;
use serde_json;
use std::fs::File;
use std::io::Write;
use tracing::{debug, info};

pub fn export_csv(report: &HarvestReport, output_path: &str) -> Result<()> {
    debug!(
        "Exporting {} records to CSV: {}",
        report.results.len(),
        output_path
    );

    let file = File::create(output_path)?;
    let mut wtr = Writer::from_writer(file);

    // Write CSV headers
    wtr.write_record(&["Name", "Phone Number", "Emails", "Website"])?;

    // Write data rows
    for record in &report.results {
        wtr.write_record(&[
            &record.name,
            &record.number,
            &record.emails.join("; "),
            &record.website,
        ])?;
    }

    wtr.flush()?;
    info!(
        "Successfully exported {} records to CSV: {}",
        report.results.len(),
        output_path
    );

    Ok(())
}

pub fn export_json(report: &HarvestReport, output_path: &str) -> Result<()> {
    debug!(
        "Exporting {} records to JSON: {}",
        report.results.len(),
        output_path
    );

    let json_string = serde_json::to_string_pretty(report)?;

    let mut file = File::create(output_path)?;
    file.write_all(json_string.as_bytes())?;

    info!(
        "Successfully exported {} records to JSON: {}",
        report.results.len(),
        output_path
    );

    Ok(())
}

pub fn print_harvest_summary(report: &HarvestReport) {
    if report.results.is_empty() {
        println!("No business records with contact details found.");
        return;
    }

    let with_phone = report
        .results
        .iter()
        .filter(|r| !r.number.is_empty())
        .count();
    let with_website = report
        .results
        .iter()
        .filter(|r| !r.website.is_empty())
        .count();
    let with_email = report
        .results
        .iter()
        .filter(|r| !r.emails.is_empty())
        .count();
    let total_emails: usize = report.results.iter().map(|r| r.emails.len()).sum();

    println!("\n=== Harvest Summary ===");
    println!("Search query: {}", report.search_query);
    println!("Business records collected: {}", report.results.len());
    println!("  With phone number: {}", with_phone);
    println!("  With website: {}", with_website);
    println!(
        "  With email addresses: {} ({} emails total)",
        with_email, total_emails
    );
    println!("=======================\n");
}

pub fn export_markdown(report: &HarvestReport, output_path: &str) -> Result<()> {
    debug!(
        "Exporting {} records to Markdown: {}",
        report.results.len(),
        output_path
    );

    if report.results.is_empty() {
        let content = format!(
            "# Business Leads Report\n\n**Search query:** {}\n\nNo business records with contact details found.\n",
            report.search_query
        );
        std::fs::write(output_path, content)?;
        info!(
            "Successfully exported empty report to Markdown: {}",
            output_path
        );
        return Ok(());
    }

    let mut content = String::new();

    // Header
    content.push_str("# Business Leads Report\n\n");
    content.push_str(&format!("**Search query:** {}\n\n", report.search_query));
    content.push_str(&format!(
        "*Generated on: {}*\n\n",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));

    // Summary statistics
    let with_phone = report
        .results
        .iter()
        .filter(|r| !r.number.is_empty())
        .count();
    let with_website = report
        .results
        .iter()
        .filter(|r| !r.website.is_empty())
        .count();
    let with_email = report
        .results
        .iter()
        .filter(|r| !r.emails.is_empty())
        .count();
    let total_emails: usize = report.results.iter().map(|r| r.emails.len()).sum();

    content.push_str("## Summary\n\n");
    content.push_str(&format!(
        "- **Business records collected:** {}\n",
        report.results.len()
    ));
    content.push_str(&format!("- **With phone number:** {}\n", with_phone));
    content.push_str(&format!("- **With website:** {}\n", with_website));
    content.push_str(&format!(
        "- **With email addresses:** {} ({} emails total)\n\n",
        with_email, total_emails
    ));

    // Records table
    content.push_str("## Records\n\n");
    content.push_str("| Name | Phone Number | Website | Emails |\n");
    content.push_str("|------|--------------|---------|--------|\n");

    for record in &report.results {
        content.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            escape_markdown(&record.name),
            escape_markdown(&record.number),
            escape_markdown(&record.website),
            escape_markdown(&record.emails.join("; "))
        ));
    }
    content.push_str("\n");

    // Footer
    content.push_str("---\n\n");
    content.push_str(
        "*Report generated by mapleads - a tool for harvesting business contact details from map search results.*\n",
    );

    std::fs::write(output_path, content)?;
    info!(
        "Successfully exported {} records to Markdown: {}",
        report.results.len(),
        output_path
    );

    Ok(())
}

fn escape_markdown(text: &str) -> String {
    text.replace("|", "\\|").replace("*", "\\*").replace("_", "\\_")
}

#[derive(Template)]
#[template(path = "report.html")]
struct HtmlReportTemplate {
    summary: HtmlSummary,
    records: Vec<BusinessRecord>,
    records_json: String,
    summary_json: String,
}

#[derive(serde::Serialize)]
struct HtmlSummary {
    search_query: String,
    total_records: usize,
    with_phone: usize,
    with_website: usize,
    with_email: usize,
    total_emails: usize,
    generated_at: String,
}

pub fn export_html(report: &HarvestReport, output_path: &str) -> Result<()> {
    debug!(
        "Exporting {} records to HTML: {}",
        report.results.len(),
        output_path
    );

    let summary = HtmlSummary {
        search_query: report.search_query.clone(),
        total_records: report.results.len(),
        with_phone: report
            .results
            .iter()
            .filter(|r| !r.number.is_empty())
            .count(),
        with_website: report
            .results
            .iter()
            .filter(|r| !r.website.is_empty())
            .count(),
        with_email: report
            .results
            .iter()
            .filter(|r| !r.emails.is_empty())
            .count(),
        total_emails: report.results.iter().map(|r| r.emails.len()).sum(),
        generated_at: Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    };

    let records_json = serde_json::to_string(&report.results)?;
    let summary_json = serde_json::to_string(&summary)?;

    let template = HtmlReportTemplate {
        summary,
        records: report.results.to_vec(),
        records_json,
        summary_json,
    };

    let html_content = template.render()?;
    std::fs::write(output_path, html_content)?;

    info!(
        "Successfully exported {} records to HTML: {}",
        report.results.len(),
        output_path
    );

    Ok(())
}
