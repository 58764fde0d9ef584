use crate::infra::{
    seed_customers, InMemoryClaimStore, InMemoryCustomerDirectory, InMemoryRewardCatalog,
};
use clap::Args;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

use loyalty_desk::error::AppError;
use loyalty_desk::loyalty::catalog::CatalogImporter;
use loyalty_desk::loyalty::claims::{
    available_points, AddOutcome, ClaimDraft, ClaimHistoryQuery, ClaimService, CustomerDirectory,
    CustomerId, PageRequest, Reward, RewardId,
};
use loyalty_desk::loyalty::search::SearchBox;
use loyalty_desk::loyalty::session::{Role, SessionProvider};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Reward-catalog CSV to import instead of the built-in demo sheet
    #[arg(long)]
    pub(crate) catalog_csv: Option<PathBuf>,
    /// Customer search typed into the autocomplete (defaults to "mari")
    #[arg(long)]
    pub(crate) search: Option<String>,
    /// Remarks attached to the demo claim
    #[arg(long)]
    pub(crate) remarks: Option<String>,
}

const DEMO_CATALOG: &str = "\
Reward ID,Name,Required Points,Active
10,Canvas Tote Bag,150,yes
20,Ceramic Mug,200,yes
30,Ten Dollar Gift Card,100,yes
40,Retired Keychain,25,no
";

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        catalog_csv,
        search,
        remarks,
    } = args;

    println!("Loyalty back office demo");

    let rewards = match catalog_csv {
        Some(path) => {
            let imported = CatalogImporter::from_path(&path)?;
            println!(
                "Catalog source: {} ({} rewards)",
                path.display(),
                imported.len()
            );
            imported
        }
        None => {
            let imported = CatalogImporter::from_reader(Cursor::new(DEMO_CATALOG))?;
            println!(
                "Catalog source: built-in demo sheet ({} rewards)",
                imported.len()
            );
            imported
        }
    };

    let directory = Arc::new(InMemoryCustomerDirectory::seeded(seed_customers()));
    let catalog = Arc::new(InMemoryRewardCatalog::seeded(rewards));
    let claims = Arc::new(InMemoryClaimStore::default());
    let service = ClaimService::new(directory.clone(), catalog, claims);

    let sessions = SessionProvider::new();
    sessions.issue("demo-token", "Demo Operator", Role::Staff);
    let context = sessions
        .authenticate("demo-token")
        .expect("demo session just issued");

    // Customer autocomplete, including a slow stale response that loses to
    // a newer keystroke.
    let query = search.unwrap_or_else(|| "mari".to_string());
    let prefix: String = query.chars().take(2).collect();

    let mut customer_box = SearchBox::new();
    let stale = customer_box.begin(prefix.clone());
    let live = customer_box.begin(query.clone());

    let stale_results = service
        .search_customers(&PageRequest::with_search(prefix.clone()))?
        .items;
    let live_results = service
        .search_customers(&PageRequest::with_search(query.clone()))?
        .items;

    println!("\nCustomer search");
    println!(
        "- typed '{}' then '{}'; the slow '{}' response was ignored: {}",
        prefix,
        query,
        prefix,
        !customer_box.resolve(stale, stale_results)
    );
    customer_box.resolve(live, live_results);
    if !customer_box.select(0) {
        println!("- no customer matched '{query}', nothing to demo");
        sessions.teardown();
        return Ok(());
    }
    let selected = customer_box.selected().expect("selection pinned").clone();
    println!(
        "- selected {} ({} points available)",
        selected.name,
        available_points(&selected)
    );

    // Compose the cart through the affordability gate.
    let mut draft = ClaimDraft::new();
    draft.select_customer(selected);
    if let Some(remarks) = remarks {
        draft.set_remarks(remarks);
    }

    let candidates = service.search_rewards(&PageRequest::default(), true)?.items;

    println!("\nComposing the cart");
    for reward in candidates {
        let name = reward.name.clone();
        let cost = reward.required_points;
        match draft.try_add(reward) {
            AddOutcome::Added { remaining } => {
                println!("- added {name} ({cost} pts), {remaining} left")
            }
            AddOutcome::Unaffordable { shortfall } => {
                println!("- skipped {name} ({cost} pts), short by {shortfall}")
            }
            AddOutcome::Inactive => println!("- skipped {name}, no longer redeemable"),
            AddOutcome::NoCustomer => println!("- skipped {name}, no customer selected"),
        }
    }
    println!(
        "- cart total {} pts, {} remaining",
        draft.total_cost(),
        draft.remaining_balance().unwrap_or_default()
    );

    // Submit and show the authoritative outcome.
    println!("\nSubmitting");
    match draft.submission() {
        Ok(submission) => match service.submit(&context, submission) {
            Ok(record) => {
                println!(
                    "- claim {} stored: {} pts across {} reward(s), status {}",
                    record.id,
                    record.points_used,
                    record.reward_ids.len(),
                    record.status.label()
                );
                if let Ok(Some(refreshed)) = directory.fetch(record.customer_id) {
                    println!(
                        "- {} now has {} points available",
                        refreshed.name,
                        available_points(&refreshed)
                    );
                }
            }
            Err(err) => println!("- rejected by the service: {err}"),
        },
        Err(err) => println!("- blocked before submission: {err}"),
    }

    // A second, overdrawn draft shows the defensive re-check: entries that
    // bypassed the gate still cannot get past the validator.
    if let Ok(Some(snapshot)) = directory.fetch(CustomerId(2)) {
        let name = snapshot.name.clone();
        let mut overdrawn = ClaimDraft::new();
        overdrawn.select_customer(snapshot);
        overdrawn.add_unchecked(Reward {
            id: RewardId(20),
            name: "Ceramic Mug".to_string(),
            required_points: 200,
            is_active: true,
        });
        println!("\nOverdraft check for {name}");
        match overdrawn.submission() {
            Ok(_) => println!("- unexpectedly passed"),
            Err(err) => println!("- blocked: {err}"),
        }
    }

    // Claim history as the admin table would page it.
    let history = service.history(&ClaimHistoryQuery::default())?;
    println!("\nClaim history ({} total)", history.total);
    for record in &history.items {
        println!(
            "- {} | customer {} | {} pts | {} | filed by {}",
            record.id,
            record.customer_id,
            record.points_used,
            record.status.label(),
            record.filed_by
        );
    }

    sessions.teardown();
    println!("\nOperator signed out");
    Ok(())
}
