use clap::Parser;
use compose_mount_guard::core::engine::exit_code;
use compose_mount_guard::core::RunRequest;
use compose_mount_guard::utils::logger;
use compose_mount_guard::{
    CliArgs, ComposeCli, GuardConfig, GuardEngine, GuardError, StdinConfirmer, SystemMountProbe,
};

fn main() {
    let args = CliArgs::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose);

    // 參數衝突必須在任何其他動作之前回報
    let request = match RunRequest::parse(&args.command, args.dry_run, args.force) {
        Ok(request) => request,
        Err(e) => fail(e),
    };

    tracing::debug!("CLI args: {:?}", args);

    // 載入配置並套用命令列覆蓋設定
    let mut config = match GuardConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => fail(e),
    };
    config.apply_overrides(args.overrides());

    let orchestrator = ComposeCli::from_config(&config);
    tracing::debug!("Master compose file: {}", orchestrator.master_file().display());

    let engine = GuardEngine::new(config, SystemMountProbe::new(), orchestrator, StdinConfirmer);

    let mut stdout = std::io::stdout();
    let result = engine.run_request(&request, &mut stdout);
    match &result {
        Ok(outcome) => tracing::debug!("Outcome: {:?}", outcome),
        Err(e) => report(e),
    }

    std::process::exit(exit_code(&result));
}

fn report(e: &GuardError) {
    tracing::error!("❌ Run failed: {} (Category: {:?})", e, e.category());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
}

fn fail(e: GuardError) -> ! {
    report(&e);
    std::process::exit(exit_code(&Err(e)));
}
