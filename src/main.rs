use peephole::{AppConfig, run};

fn main() {
    env_logger::init();
    run(AppConfig::default());
}
