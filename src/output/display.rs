//! Display functions for command results

use super::formatters::{create_progress_bar, preview_words};
use crate::dictionary::{CacheStats, LookupStatus, ValidationResult};
use crate::engine::{BackupReport, CleanupReport, CollectionStats, CollectionValidation};
use colored::Colorize;

/// Invalid words listed before truncating
const PREVIEW_LIMIT: usize = 20;

fn header(title: &str) {
    println!("\n{}", "═".repeat(60).cyan());
    println!(" {} ", title.bright_cyan().bold());
    println!("{}", "═".repeat(60).cyan());
}

/// Print a collection validation summary
pub fn print_validation_report(report: &CollectionValidation) {
    header("COLLECTION VALIDATION");

    let pct = report.validity_percentage();
    println!("\n📊 {}", "Summary:".bright_cyan().bold());
    println!("   Words checked:  {}", report.total_words);
    println!("   Valid:          {}", report.valid_words.to_string().green());
    println!("   Invalid:        {}", report.invalid_words.to_string().red());
    println!(
        "   Validity:       [{}] {}",
        create_progress_bar(pct, 100.0, 30).green(),
        format!("{pct:.2}%").bright_yellow()
    );

    if !report.invalid_word_list.is_empty() {
        println!("\n❌ {}", "Invalid words:".red().bold());
        println!("   {}", preview_words(&report.invalid_word_list, PREVIEW_LIMIT));
    }
    if !report.unverified_word_list.is_empty() {
        println!(
            "\n⚠️  {} {}",
            "Lookup errors (not confirmed invalid):".yellow().bold(),
            report.unverified_word_list.len()
        );
        println!("   {}", preview_words(&report.unverified_word_list, PREVIEW_LIMIT));
    }
}

/// Print the outcome of a cleanup run
pub fn print_cleanup_report(report: &CleanupReport, total_words: usize) {
    header("CLEANUP");

    println!("\n   Invalid found:  {}", report.found_invalid);
    println!(
        "   Removed:        {}",
        report.removed_count.to_string().bright_yellow().bold()
    );
    println!("   Words now:      {total_words}");

    if !report.invalid_words.is_empty() {
        println!("\n   {}", preview_words(&report.invalid_words, PREVIEW_LIMIT));
    }
    println!("\n{}", report.action_taken.bold());
}

pub fn print_backup_report(report: &BackupReport) {
    println!(
        "\n💾 Backed up {} words to {}",
        report.word_count.to_string().bright_yellow().bold(),
        report.backup_location.cyan()
    );
    println!("   {}", report.timestamp.dimmed());
}

/// Print a single dictionary lookup
pub fn print_lookup_result(result: &ValidationResult) {
    let verdict = match result.status {
        LookupStatus::Found => "✅ valid".green().bold(),
        LookupStatus::NotFound => "❌ not found".red().bold(),
        LookupStatus::InvalidFormat => "❌ invalid format".red().bold(),
        LookupStatus::Error => "⚠️  lookup error".yellow().bold(),
    };

    println!(
        "\n{} {}",
        result.word.to_uppercase().bright_yellow().bold(),
        verdict
    );
    println!("   {}", result.reason.dimmed());

    if !result.word_forms.is_empty() {
        println!("   Forms: {}", result.word_forms.join(", ").cyan());
    }
    for (i, definition) in result.definitions.iter().enumerate() {
        println!("   {}. {definition}", i + 1);
    }
}

/// Print collection and cache statistics
pub fn print_stats(stats: &CollectionStats, cache: &CacheStats) {
    header("WORD COLLECTION");

    println!("\n📊 {}", "Collection:".bright_cyan().bold());
    println!(
        "   Total words:    {}",
        stats.total_words.to_string().bright_yellow().bold()
    );
    if let (Some(min), Some(max), Some(avg)) =
        (stats.min_length, stats.max_length, stats.avg_length)
    {
        println!("   Length:         {min}–{max} (avg {avg:.2})");
    }

    let connected = if stats.storage_info.connected {
        "connected".green()
    } else {
        "disconnected".red()
    };
    println!("\n💾 {}", "Storage:".bright_cyan().bold());
    println!(
        "   Provider:       {} ({connected})",
        stats.storage_info.provider
    );

    println!("\n📖 {}", "Dictionary cache:".bright_cyan().bold());
    println!("   Cached words:   {}/{}", cache.cached_words, cache.capacity);
    println!(
        "   Hit rate:       {:.1}% ({} hits, {} misses)",
        cache.hit_rate() * 100.0,
        cache.hits,
        cache.misses
    );
}
