use std::env;

use kiwi_binder::{AnalyzeOption, BuildOption, KiwiBuilder, KiwiLibrary, PosType};

// Usage: analyze [TEXT] [MATCH_OPTIONS]
// MATCH_OPTIONS is a list such as "url|email|z_coda". Set RUST_LOG=debug to
// see handle lifecycle messages.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let text = args
        .next()
        .unwrap_or_else(|| "안녕하세요 코딩냄비입니다. 부글부글.".to_string());
    let match_options = match args.next() {
        Some(list) => AnalyzeOption::parse_list(&list)?,
        None => AnalyzeOption::ALL,
    };
    let model_path = env::var("KIWI_MODEL_PATH").unwrap_or_else(|_| "./models/base".to_string());

    let library = KiwiLibrary::load_from_env_or_default()?;
    let version = library.version_info()?;
    log::info!("kiwi {} (queried in {:?})", version.version, version.elapsed);

    let mut builder =
        KiwiBuilder::new(&library, &model_path, 1, BuildOption::INTEGRATE_ALLOMORPH)?;
    builder.add_word("코딩냄비", PosType::Nnp, 0.0)?;
    let kiwi = builder.build()?;

    for (rank, candidate) in kiwi.analyze(&text, 1, match_options)?.iter().enumerate() {
        println!("#{rank} score={}", candidate.score);
        for token in &candidate.tokens {
            println!("  {:>3} {}/{}", token.position, token.form, token.tag);
        }
    }

    Ok(())
}
