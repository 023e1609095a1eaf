use crate::infra::{default_scoring_config, seed_roster, InMemoryRoster, LoggingProgressSink};
use clap::Args;
use reward_engine::error::AppError;
use reward_engine::workflows::submissions::{
    AppearanceKind, ArtAttributes, ArtQuality, BackgroundKind, BackgroundSet, CharacterEntry,
    RecipientRef, RewardBundle, RewardService, SubmissionAttributes, SubmissionContext,
    SubmissionId, TrainerId, UserId, WritingAttributes,
};
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Word count used for the writing scenario
    #[arg(long, default_value_t = 240)]
    pub(crate) word_count: u32,
}

type DemoService = RewardService<InMemoryRoster, LoggingProgressSink>;

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let roster = Arc::new(InMemoryRoster::default());
    seed_roster(&roster);
    let progress = Arc::new(LoggingProgressSink::default());
    let service = RewardService::new(roster.clone(), progress.clone(), default_scoring_config());

    let ctx = SubmissionContext {
        submitter: UserId("user-ash".to_string()),
    };

    println!("== Writing submission ({} words) ==", args.word_count);
    let writing = SubmissionAttributes::Writing(WritingAttributes {
        word_count: args.word_count,
        participants: vec![RecipientRef::trainer(1), RecipientRef::monster(10, 1)],
        npcs: Vec::new(),
    });
    let bundle = service.calculate(&ctx, &writing)?;
    render_bundle(&bundle);
    service.finalize(&ctx, SubmissionId("demo-writing".to_string()), &bundle)?;
    println!(
        "  trainer Rowan is now level {}, holding {} coins",
        roster
            .level_of(&RecipientRef::trainer(1))
            .unwrap_or_default(),
        roster.coin_balance(TrainerId(1))
    );

    println!();
    println!("== Capped art submission ==");
    let capped = SubmissionAttributes::Art(ArtAttributes {
        quality: ArtQuality::LineArt,
        backgrounds: BackgroundSet::none(),
        uniquely_difficult: false,
        characters: vec![CharacterEntry {
            recipient: RecipientRef::monster(11, 1),
            appearance: AppearanceKind::Bust,
            complexity: None,
            custom_levels: Some(5),
        }],
        npcs: Vec::new(),
    });
    let bundle = service.calculate(&ctx, &capped)?;
    render_bundle(&bundle);
    let outcome = service.finalize(&ctx, SubmissionId("demo-capped".to_string()), &bundle)?;
    run_allocations(&service, &roster, &outcome.pools)?;

    println!();
    println!("== Gift art submission ==");
    let gift = SubmissionAttributes::Art(ArtAttributes {
        quality: ArtQuality::Rendered,
        backgrounds: BackgroundSet::from_kinds(&[BackgroundKind::Simple]),
        uniquely_difficult: false,
        characters: vec![CharacterEntry {
            recipient: RecipientRef::trainer(2),
            appearance: AppearanceKind::FullBody,
            complexity: None,
            custom_levels: None,
        }],
        npcs: Vec::new(),
    });
    let bundle = service.calculate(&ctx, &gift)?;
    render_bundle(&bundle);
    let outcome = service.finalize(&ctx, SubmissionId("demo-gift".to_string()), &bundle)?;
    for pool in &outcome.pools {
        let record = service.allocate(&pool.pool_id, RecipientRef::trainer(1), 4)?;
        println!(
            "  allocated {} gift level(s) to trainer Rowan for {} coins",
            record.units, record.coins_awarded
        );
        let closed = service.close_pool(&pool.pool_id)?;
        println!(
            "  closed pool {} with {} unit(s) forfeited",
            closed.pool.pool_id, closed.remaining
        );
    }

    println!();
    println!(
        "Rowan finished at level {} with {} coins; {} secondary update(s) were emitted.",
        roster
            .level_of(&RecipientRef::trainer(1))
            .unwrap_or_default(),
        roster.coin_balance(TrainerId(1)),
        progress.updates().len()
    );

    Ok(())
}

fn run_allocations(
    service: &DemoService,
    roster: &InMemoryRoster,
    pools: &[reward_engine::workflows::submissions::PoolOpening],
) -> Result<(), AppError> {
    for pool in pools {
        println!(
            "  opened {} pool {} with {} unit(s)",
            pool.kind.label(),
            pool.pool_id,
            pool.total_units
        );
        let record = service.allocate(&pool.pool_id, RecipientRef::monster(10, 1), 1)?;
        println!(
            "  redirected {} capped level(s) to monster Ember (now level {})",
            record.units,
            roster
                .level_of(&RecipientRef::monster(10, 1))
                .unwrap_or_default()
        );
    }
    Ok(())
}

fn render_bundle(bundle: &RewardBundle) {
    println!(
        "  {} levels overall, {} coins, {} redistributable, {} gift",
        bundle.overall_levels, bundle.total_coins, bundle.redistributable_pool, bundle.gift_pool
    );
    for line in &bundle.lines {
        println!(
            "    {}: {} requested, {} applied, {} excess, {} coins",
            line.recipient,
            line.levels_requested,
            line.levels_applied,
            line.excess_levels,
            line.coins
        );
    }
}
