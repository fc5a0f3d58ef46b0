//! Plinko entry point
//!
//! Native: runs a batch of drops through the reference board and prints the
//! session statistics. The browser build is driven from `plinko::web`.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;

    use clap::Parser;
    use plinko::consts::SIM_DT;
    use plinko::persistence::SaveEnvelope;
    use plinko::sim::{Board, BoardEvent, DropSession, SeededRandom, tick};
    use plinko::{RiskPreset, Settings};

    #[derive(Parser, Debug)]
    #[command(name = "plinko", about = "Drop balls through a weighted Plinko board")]
    struct Args {
        /// Number of balls to drop
        #[arg(long, default_value_t = 100)]
        drops: u32,

        /// Bet per ball (defaults to the configured bet)
        #[arg(long)]
        bet: Option<f64>,

        /// Payout table
        #[arg(long, value_enum)]
        risk: Option<RiskPreset>,

        /// RNG seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,

        /// Settings JSON file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Save file to resume from and write back to
        #[arg(long)]
        save: Option<PathBuf>,

        /// Balls in the air at once
        #[arg(long, default_value_t = 8)]
        concurrent: u32,
    }

    fn load_settings(args: &Args) -> plinko::Result<Settings> {
        let mut settings = match &args.config {
            Some(path) => Settings::from_json(&std::fs::read_to_string(path)?)?,
            None => Settings::load(),
        };
        if let Some(risk) = args.risk {
            settings.risk = risk;
        }
        if args.seed.is_some() {
            settings.seed = args.seed;
        }
        Ok(settings)
    }

    pub fn run() -> plinko::Result<()> {
        let args = Args::parse();
        let settings = load_settings(&args)?;

        let seed = settings.seed.unwrap_or_else(rand::random);
        log::info!("Seed {} ({} risk)", seed, settings.risk.as_str());

        let mut session = DropSession::from_settings(&settings, SeededRandom::new(seed))?;
        if let Some(path) = args.save.as_deref().filter(|p| p.exists()) {
            session.restore(SaveEnvelope::read_file(path)?.snapshot)?;
        }
        let mut board = Board::from_settings(&settings);
        let bet = args.bet.unwrap_or(settings.default_bet);

        let mut started = 0;
        let mut landed = 0;
        let mut expired = 0;
        while started < args.drops || !board.is_idle() {
            // Keep a few balls in the air at once
            while started < args.drops && (board.balls.len() as u32) < args.concurrent.max(1) {
                let drop = session.start(bet)?;
                board.spawn(&drop, session.target_position(drop.drop_id)?);
                started += 1;
            }

            for event in tick(&mut board, SIM_DT) {
                match event {
                    BoardEvent::Landed { drop_id, .. } => {
                        session.resolve(drop_id)?;
                        landed += 1;
                    }
                    BoardEvent::TimedOut { drop_id } => {
                        session.expire(drop_id)?;
                        expired += 1;
                    }
                }
            }
            session.prune_settled();
        }

        let stats = session.stats();
        println!("\n{} risk, {} drops at {:.2}", settings.risk.as_str(), started, bet);
        println!("{:>6} {:>10} {:>8} {:>8}", "zone", "multiplier", "hits", "%");
        for line in session.zone_stats() {
            println!(
                "{:>6} {:>10} {:>8} {:>7.2}%",
                line.zone_id.0, line.multiplier, line.hits, line.percentage
            );
        }
        println!("landed {}, expired {}", landed, expired);
        println!("total drops this session: {}", stats.total_drops);
        println!("return to player: {:.4}", stats.return_to_player());
        if settings.show_history {
            let history = session.history();
            if let Some(best) = history.best_multiplier() {
                println!("best recent multiplier: x{}", best);
            }
            println!("last {} drops net: {:.2}", history.len(), history.recent_net());
        }
        println!("balance: {:.2}", session.display_balance());

        if let Some(path) = &args.save {
            SaveEnvelope::new(session.snapshot()).write_file(path)?;
        }
        Ok(())
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Plinko (native) starting...");

    if let Err(e) = native::run() {
        log::error!("{}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is plinko::web::start, this is just to satisfy the compiler
}
