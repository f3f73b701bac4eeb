use criterion::{Criterion, black_box, criterion_group, criterion_main};

use altrium_auth::{TokenConfig, TokenKind, TokenService};
use altrium_core::UserId;

fn token_benchmarks(c: &mut Criterion) {
    let svc = TokenService::new(TokenConfig::with_secret("bench-secret").unwrap());
    let subject = UserId::new();
    let token = svc.issue(subject, TokenKind::Access).unwrap();

    c.bench_function("token_issue_access", |b| {
        b.iter(|| svc.issue(black_box(subject), TokenKind::Access).unwrap())
    });

    c.bench_function("token_verify_access", |b| {
        b.iter(|| svc.verify(black_box(&token)).unwrap())
    });

    c.bench_function("token_refresh_pair", |b| {
        let pair = svc.issue_pair(subject).unwrap();
        b.iter(|| svc.refresh_pair(black_box(&pair.refresh_token)).unwrap())
    });
}

criterion_group!(benches, token_benchmarks);
criterion_main!(benches);
