//! Database seeding: demo content, coin holders, and comment threads.
//!
//! Everything is upsert-shaped so each command can be re-run; `comments`
//! clears the post's thread before writing a fresh one.

use std::collections::HashSet;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;

use coinpress_core::{BadgeTier, generate_id};
use coinpress_db_postgres::{CommentSeed, SeedStore, create_pool, migrations};
use coinpress_server::AppConfig;

use crate::cli::{CommentsArgs, HoldersArgs};
use crate::output::{print_success, print_warning};

const DEMO_WRITER_WALLET: &str = "0x8f3c2a917fd04c7aa2951d3e60bc0b1f4a6de913";
const DEMO_COIN_ADDRESS: &str = "0x51e8b7a24c1d69f08d43aa7cd1b7f6ea905c3df2";
const DEMO_POST_ID: &str = "post_launch_notes";
const DEMO_COIN_ID: &str = "coin_maya";
const DEMO_POST_BODY: &str = "Notes from the first month of writing onchain.";
const BASE_CHAIN_ID: i32 = 8453;

const MAX_COMMENT_COUNT: usize = 4000;

const COMMENT_BODIES: &[&str] = &[
    "gm ☀️",
    "great read",
    "💙",
    "supporter checking in",
    "badge flex",
    "more posts like this",
    "holding since launch",
    "patron gang",
    "this one hits",
    "bullish on words",
    "comment section assemble",
    "coins go brr",
    "first",
    "came for the badges",
    "stayed for the writing",
    "gm gm",
];

async fn seed_store(config: &AppConfig) -> Result<SeedStore> {
    let pg = config
        .storage
        .postgres
        .clone()
        .ok_or_else(|| anyhow::anyhow!("storage.postgres must be configured"))?;
    let pool = create_pool(&pg.pool_settings()).await?;
    if pg.run_migrations {
        migrations::run(&pool).await?;
    }
    Ok(SeedStore::new(pool))
}

/// Creates the demo writer with her post and coin.
pub async fn demo(config: &AppConfig) -> Result<()> {
    let store = seed_store(config).await?;

    let user_id = store
        .upsert_user_by_wallet(DEMO_WRITER_WALLET, "Maya Reed")
        .await?;
    let writer_id = store.upsert_writer(&user_id, "maya").await?;
    store
        .upsert_post(DEMO_POST_ID, &writer_id, "Launch Notes", DEMO_POST_BODY)
        .await?;
    store
        .upsert_coin(
            DEMO_COIN_ID,
            &writer_id,
            BASE_CHAIN_ID,
            DEMO_COIN_ADDRESS,
            "MAYA",
        )
        .await?;

    print_success(&format!(
        "Demo content ready: {DEMO_POST_ID} backed by {DEMO_COIN_ID}"
    ));
    Ok(())
}

/// Imports holder balances from an exchange export and assigns badge tiers.
pub async fn holders(config: &AppConfig, args: &HoldersArgs) -> Result<()> {
    let raw = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file))?;
    let rows = parse_holders(&raw);
    println!("Found {} holders in {}", rows.len(), args.file);

    let store = seed_store(config).await?;
    let coin_id = store
        .coin_for_post(DEMO_POST_ID)
        .await?
        .ok_or_else(|| anyhow::anyhow!("demo coin not found; run `coinpress seed demo` first"))?;

    let excluded: HashSet<String> = args.exclude.iter().map(|a| a.to_lowercase()).collect();

    let mut created = 0usize;
    let mut skipped = 0usize;
    for row in &rows {
        if excluded.contains(&row.address) {
            skipped += 1;
            continue;
        }
        let Ok(balance) = row.balance.parse::<f64>() else {
            skipped += 1;
            continue;
        };
        if balance == 0.0 {
            skipped += 1;
            continue;
        }

        let display_name = truncate_address(&row.address);
        let user_id = store
            .upsert_user_by_wallet(&row.address, &display_name)
            .await?;
        let tier = BadgeTier::from_usd_value(balance * args.token_price);
        store
            .upsert_holding(&coin_id, &user_id, &row.balance, tier)
            .await?;

        created += 1;
        if created % 100 == 0 {
            println!("Progress: {created}/{}", rows.len());
        }
    }

    print_success(&format!("Seeded {created} holders, skipped {skipped}"));
    Ok(())
}

/// Builds a comment thread where every holder comments once, padded with
/// filler users up to the requested count.
pub async fn comments(config: &AppConfig, args: &CommentsArgs) -> Result<()> {
    let store = seed_store(config).await?;
    let post_id = args.post.as_deref().unwrap_or(DEMO_POST_ID);
    let coin_id = store.coin_for_post(post_id).await?.ok_or_else(|| {
        anyhow::anyhow!("post {post_id} has no writer coin; run `coinpress seed demo` first")
    })?;

    let holders = store.list_holder_user_ids(&coin_id).await?;
    if holders.is_empty() {
        anyhow::bail!("no coin holders found; run `coinpress seed holders` first");
    }

    let (target, capped) = normalize_comment_target(args.count as usize, holders.len());
    if capped {
        print_warning(&format!("Capping the thread at {MAX_COMMENT_COUNT} comments"));
    }

    let fake_needed = target.saturating_sub(holders.len());
    let holder_authors = holders.len().min(target);
    let mut authors = holders;
    for index in 1..=fake_needed {
        let (display_name, wallet) = filler_user(index);
        let id = store.upsert_user_by_wallet(&wallet, &display_name).await?;
        authors.push(id);
    }

    // Every author comments exactly once, in shuffled order
    authors.shuffle(&mut rand::thread_rng());
    authors.truncate(target);

    let now = Utc::now();
    let rows: Vec<CommentSeed> = authors
        .iter()
        .enumerate()
        .map(|(index, user_id)| CommentSeed {
            id: generate_id("comment"),
            post_id: post_id.to_string(),
            user_id: user_id.clone(),
            body: COMMENT_BODIES[index % COMMENT_BODIES.len()].to_string(),
            created_at: comment_timestamp(now, index, target),
        })
        .collect();

    let removed = store.delete_comments_for_post(post_id).await?;
    if removed > 0 {
        println!("Cleared {removed} existing comments on {post_id}");
    }
    let inserted = store.insert_comments(&rows).await?;

    print_success(&format!(
        "Seeded {inserted} comments on {post_id} ({holder_authors} holders, {fake_needed} filler users)"
    ));
    Ok(())
}

struct HolderRow {
    address: String,
    balance: String,
}

/// Parses the exchange export: a header row, then `address<TAB>balance`
/// lines with thousands separators in the balance column.
fn parse_holders(raw: &str) -> Vec<HolderRow> {
    raw.trim()
        .lines()
        .skip(1)
        .filter_map(|line| {
            let mut fields = line.split('\t');
            let address = fields.next()?.trim().to_lowercase();
            let balance = fields.next()?.trim().replace(',', "");
            if address.is_empty() || balance.is_empty() {
                return None;
            }
            Some(HolderRow { address, balance })
        })
        .collect()
}

fn truncate_address(address: &str) -> String {
    if address.len() <= 10 {
        return address.to_string();
    }
    format!("{}...{}", &address[..6], &address[address.len() - 4..])
}

/// At least one comment per holder, never more than the hard cap.
fn normalize_comment_target(requested: usize, holder_count: usize) -> (usize, bool) {
    let desired = requested.max(holder_count);
    let capped = desired.min(MAX_COMMENT_COUNT);
    (capped, capped < desired)
}

/// Deterministic filler identity; re-running the seed reuses the same rows.
fn filler_user(index: usize) -> (String, String) {
    let hex = format!("{index:04x}");
    let display_name = format!("0xfake...{hex}");
    let mut wallet = format!("0xfake{hex}");
    while wallet.len() < 42 {
        wallet.push('0');
    }
    (display_name, wallet)
}

/// Spreads comments into the past with slightly irregular gaps so the
/// thread doesn't look machine-stamped.
fn comment_timestamp(now: DateTime<Utc>, index: usize, total: usize) -> DateTime<Utc> {
    let minutes_between = (2 + index % 5) as i64;
    let minutes_ago = minutes_between * (total - index) as i64;
    now - Duration::minutes(minutes_ago)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_holders_skips_header_and_strips_commas() {
        let raw = "HolderAddress\tBalance\n\
                   0xABCDEF0123456789abcdef0123456789abcdef01\t1,234,567.89\n\
                   0x1111111111111111111111111111111111111111\t42\n\
                   \n\
                   0x2222222222222222222222222222222222222222\t";
        let rows = parse_holders(raw);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].address, "0xabcdef0123456789abcdef0123456789abcdef01");
        assert_eq!(rows[0].balance, "1234567.89");
        assert_eq!(rows[1].balance, "42");
    }

    #[test]
    fn truncate_address_keeps_ends() {
        assert_eq!(
            truncate_address("0xabcdef0123456789abcdef0123456789abcdef01"),
            "0xabcd...ef01"
        );
        assert_eq!(truncate_address("0xshort"), "0xshort");
    }

    #[test]
    fn comment_target_covers_holders_and_respects_cap() {
        assert_eq!(normalize_comment_target(2000, 50), (2000, false));
        assert_eq!(normalize_comment_target(10, 200), (200, false));
        assert_eq!(normalize_comment_target(2000, 4500), (4000, true));
        assert_eq!(normalize_comment_target(5000, 10), (4000, true));
    }

    #[test]
    fn filler_user_is_deterministic_and_wallet_sized() {
        let (name_a, wallet_a) = filler_user(1);
        let (name_b, wallet_b) = filler_user(1);
        assert_eq!(name_a, name_b);
        assert_eq!(wallet_a, wallet_b);
        assert_eq!(wallet_a.len(), 42);
        assert_eq!(name_a, "0xfake...0001");
        assert_ne!(filler_user(2).1, wallet_a);
    }

    #[test]
    fn comment_timestamps_walk_back_from_now() {
        let now = Utc::now();
        // index 0 pace is 2 minutes, ten slots out
        assert_eq!(comment_timestamp(now, 0, 10), now - Duration::minutes(20));
        // last slot: pace 2 + (9 % 5), one slot out
        assert_eq!(comment_timestamp(now, 9, 10), now - Duration::minutes(6));
    }
}
