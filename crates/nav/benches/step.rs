use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nav::{EnvConfig, NavEnv, RewardKind, TargetMethod, TaskSpec};
use std::sync::Arc;
use world::{Vec3, World};

fn bench_env_step(c: &mut Criterion) {
    let world = Arc::new(World::load("tests/data/kitchen.json").expect("fixture scene"));
    let task = TaskSpec::at("Mug", Vec3::new(0.0, 0.9, 0.25), Vec3::new(0.0, 90.0, 0.0));

    for reward in [RewardKind::Area, RewardKind::Step] {
        let config = EnvConfig::new(TargetMethod::Embedding, reward).with_seed(0);
        let mut env = NavEnv::new(world.clone(), config, task.clone()).expect("environment");
        let actions = env.actions().len();
        let rng = fastrand::Rng::with_seed(1);
        c.bench_function(&format!("nav_step_{reward:?}").to_lowercase(), |b| {
            b.iter(|| {
                if env.is_terminal() {
                    env.reset().expect("reset");
                }
                black_box(env.step(rng.usize(..actions)).expect("step"))
            });
        });
    }
}

fn bench_similarity_mask(c: &mut Criterion) {
    let world = Arc::new(World::load("tests/data/kitchen.json").expect("fixture scene"));
    let config = EnvConfig::new(TargetMethod::Embedding, RewardKind::Area).with_seed(0);
    let mut env = NavEnv::new(world, config, TaskSpec::object("Mug")).expect("environment");
    env.reset_at(1).expect("reset");
    c.bench_function("nav_similarity_mask", |b| {
        b.iter(|| black_box(env.render_similarity_mask().expect("mask")));
    });
}

criterion_group!(benches, bench_env_step, bench_similarity_mask);
criterion_main!(benches);
