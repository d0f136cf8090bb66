use std::collections::VecDeque;

/// Return the first `count` primes, smallest first.
pub fn primes(count: usize) -> Vec<u64> {
    let mut primes = Vec::with_capacity(count);
    if count == 0 {
        return primes;
    }

    // The n-th prime is below n (ln n + ln ln n) for n >= 6.
    let n = count.max(6) as f64;
    let limit = (n * (n.ln() + n.ln().ln())).ceil() as usize + 1;

    let mut composite = vec![false; limit + 1];
    for i in 2..=limit {
        if composite[i] {
            continue;
        }
        primes.push(i as u64);
        if primes.len() == count {
            break;
        }
        let mut j = i * i;
        while j <= limit {
            composite[j] = true;
            j += i;
        }
    }
    primes
}

/// Return the breadth-first distance between every pair of vertices of `g`,
/// or `None` for pairs in different components.
pub fn distances(g: &[Vec<usize>]) -> Vec<Vec<Option<u32>>> {
    let n = g.len();
    let mut all = Vec::with_capacity(n);
    let mut queue = VecDeque::new();
    for s in 0..n {
        let mut dist = vec![None; n];
        dist[s] = Some(0);
        queue.push_back(s);
        while let Some(u) = queue.pop_front() {
            let d = dist[u].unwrap_or(0) + 1;
            for &w in &g[u] {
                if dist[w].is_none() {
                    dist[w] = Some(d);
                    queue.push_back(w);
                }
            }
        }
        all.push(dist);
    }
    all
}

/// Assign each key its 1-based position among the distinct sorted keys.
/// Returns the ids and the number of distinct keys.
pub fn dense_ranks<K: Ord>(keys: &[K]) -> (Vec<u64>, usize) {
    let mut order: Vec<usize> = (0..keys.len()).collect();
    order.sort_by(|&a, &b| keys[a].cmp(&keys[b]));

    let mut ids = vec![0; keys.len()];
    let mut id = 0;
    for (i, &v) in order.iter().enumerate() {
        if i == 0 || keys[order[i - 1]] != keys[v] {
            id += 1;
        }
        ids[v] = id;
    }
    (ids, id as usize)
}
