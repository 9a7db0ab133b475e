use bytes::Bytes;
use rand::Rng;
use std::cmp::Ordering;

use crate::zset::range::{LexRange, ScoreRange};
use crate::zset::Order;

const MAX_LEVEL: usize = 32;
// Probability of promoting a node one level up.
const PROMOTION: f64 = 0.25;
// Index of the sentinel node. It owns `MAX_LEVEL` links and never holds an entry.
const HEAD: usize = 0;

/// Compares two `(score, member)` entries: by score first, then by member bytes for ties.
pub fn cmp_entry(s1: f64, m1: &[u8], s2: f64, m2: &[u8]) -> Ordering {
    s1.partial_cmp(&s2)
        .unwrap_or(Ordering::Equal)
        .then_with(|| m1.cmp(m2))
}

#[derive(Debug, Clone, Copy, Default)]
struct Link {
    forward: Option<usize>,
    // Number of level-0 hops this link skips. For a link without a forward node it is the
    // number of nodes after the owner.
    span: usize,
}

#[derive(Debug)]
struct Node {
    member: Bytes,
    score: f64,
    backward: Option<usize>,
    links: Vec<Link>,
}

impl Node {
    fn new(score: f64, member: Bytes, level: usize) -> Node {
        Node {
            member,
            score,
            backward: None,
            links: vec![Link::default(); level],
        }
    }
}

/// A skiplist whose links carry spans, so that the position of any entry can be computed while
/// searching for it. Nodes live in an arena and refer to each other by index; freed slots are
/// recycled.
#[derive(Debug)]
pub struct SkipList {
    nodes: Vec<Node>,
    free: Vec<usize>,
    tail: Option<usize>,
    level: usize,
    len: usize,
}

impl Default for SkipList {
    fn default() -> Self {
        Self::new()
    }
}

impl SkipList {
    pub fn new() -> SkipList {
        SkipList {
            nodes: vec![Node::new(0.0, Bytes::new(), MAX_LEVEL)],
            free: Vec::new(),
            tail: None,
            level: 1,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Inserts an entry. The caller guarantees `member` is not already present.
    pub fn insert(&mut self, score: f64, member: Bytes) {
        let mut update = [HEAD; MAX_LEVEL];
        let mut rank = [0usize; MAX_LEVEL];

        let mut x = HEAD;
        for i in (0..self.level).rev() {
            rank[i] = if i + 1 == self.level { 0 } else { rank[i + 1] };
            while let Some(next) = self.forward(x, i) {
                if !self.precedes(next, score, &member) {
                    break;
                }
                rank[i] += self.nodes[x].links[i].span;
                x = next;
            }
            update[i] = x;
        }

        let level = random_level();
        if level > self.level {
            for i in self.level..level {
                rank[i] = 0;
                update[i] = HEAD;
                self.nodes[HEAD].links[i].span = self.len;
            }
            self.level = level;
        }

        let x = self.alloc(score, member, level);
        for i in 0..level {
            let prev = update[i];
            let Link { forward, span } = self.nodes[prev].links[i];
            let distance = rank[0] - rank[i];

            self.nodes[x].links[i] = Link {
                forward,
                span: span - distance,
            };
            self.nodes[prev].links[i] = Link {
                forward: Some(x),
                span: distance + 1,
            };
        }

        // Links above the new node's height now jump over one more node.
        for (i, prev) in update.iter().enumerate().take(self.level).skip(level) {
            self.nodes[*prev].links[i].span += 1;
        }

        self.nodes[x].backward = (update[0] != HEAD).then_some(update[0]);
        match self.nodes[x].links[0].forward {
            Some(next) => self.nodes[next].backward = Some(x),
            None => self.tail = Some(x),
        }

        self.len += 1;
    }

    /// Removes the entry for `(score, member)`. Returns `false` if it is not present.
    pub fn remove(&mut self, score: f64, member: &[u8]) -> bool {
        let update = self.search(score, member);

        match self.forward(update[0], 0) {
            Some(x) if self.is_entry(x, score, member) => {
                self.unlink(x, &update);
                true
            }
            _ => false,
        }
    }

    /// Moves `member` from `score` to `new_score`. The node is updated in place when its
    /// neighbours still bracket the new key, otherwise it is unlinked and inserted again.
    pub fn update_score(&mut self, score: f64, member: &[u8], new_score: f64) {
        let update = self.search(score, member);
        let x = match self.forward(update[0], 0) {
            Some(x) if self.is_entry(x, score, member) => x,
            _ => return,
        };

        let after_prev = self.nodes[x]
            .backward
            .map_or(true, |prev| self.precedes(prev, new_score, member));
        let before_next = self
            .forward(x, 0)
            .map_or(true, |next| !self.precedes(next, new_score, member));

        if after_prev && before_next {
            self.nodes[x].score = new_score;
            return;
        }

        let node = self.unlink(x, &update);
        self.insert(new_score, node.member);
    }

    /// Zero-based ascending position of `(score, member)`.
    pub fn rank(&self, score: f64, member: &[u8]) -> Option<usize> {
        let mut rank = 0;
        let mut x = HEAD;

        for i in (0..self.level).rev() {
            while let Some(next) = self.forward(x, i) {
                let node = &self.nodes[next];
                if cmp_entry(node.score, &node.member, score, member) == Ordering::Greater {
                    break;
                }
                rank += self.nodes[x].links[i].span;
                x = next;
            }

            if x != HEAD && self.is_entry(x, score, member) {
                return Some(rank - 1);
            }
        }

        None
    }

    /// Iterates entries starting from the entry at ascending position `rank`.
    pub fn iter_from_rank(&self, rank: usize, order: Order) -> Iter<'_> {
        Iter {
            list: self,
            cursor: self.node_at(rank),
            order,
        }
    }

    pub fn iter(&self, order: Order) -> Iter<'_> {
        let cursor = match order {
            Order::Ascending => self.forward(HEAD, 0),
            Order::Descending => self.tail,
        };

        Iter {
            list: self,
            cursor,
            order,
        }
    }

    /// Entries whose score falls in `range`, walking in `order`.
    pub fn range_by_score(
        &self,
        range: ScoreRange,
        order: Order,
    ) -> impl Iterator<Item = (&Bytes, f64)> + '_ {
        let cursor = match order {
            Order::Ascending => self.first_in_score_range(&range),
            Order::Descending => self.last_in_score_range(&range),
        };

        Iter {
            list: self,
            cursor,
            order,
        }
        .take_while(move |(_, score)| range.contains(*score))
    }

    /// Entries whose member falls in `range`, walking in `order`. Only meaningful when all the
    /// entries share one score; see `SortedSet::range_by_lex`.
    pub fn range_by_lex<'a>(
        &'a self,
        range: &'a LexRange,
        order: Order,
    ) -> impl Iterator<Item = (&'a Bytes, f64)> + 'a {
        let cursor = match order {
            Order::Ascending => self.first_in_lex_range(range),
            Order::Descending => self.last_in_lex_range(range),
        };

        Iter {
            list: self,
            cursor,
            order,
        }
        .take_while(move |(member, _)| range.contains(member))
    }

    pub fn count_in_score_range(&self, range: &ScoreRange) -> usize {
        let first = self.first_in_score_range(range);
        let last = self.last_in_score_range(range);
        self.count_between(first, last)
    }

    pub fn count_in_lex_range(&self, range: &LexRange) -> usize {
        let first = self.first_in_lex_range(range);
        let last = self.last_in_lex_range(range);
        self.count_between(first, last)
    }

    /// Removes entries at ascending positions `start..=stop`, returning their members.
    pub fn remove_range_by_rank(&mut self, start: usize, stop: usize) -> Vec<Bytes> {
        let mut update = [HEAD; MAX_LEVEL];
        let mut traversed = 0;
        let mut x = HEAD;

        for i in (0..self.level).rev() {
            while let Some(next) = self.forward(x, i) {
                let span = self.nodes[x].links[i].span;
                if traversed + span > start {
                    break;
                }
                traversed += span;
                x = next;
            }
            update[i] = x;
        }

        let mut removed = Vec::new();
        let mut cursor = self.forward(x, 0);
        let mut rank = start;
        while let Some(node) = cursor {
            if rank > stop {
                break;
            }
            cursor = self.forward(node, 0);
            removed.push(self.unlink(node, &update).member);
            rank += 1;
        }

        removed
    }

    pub fn remove_range_by_score(&mut self, range: &ScoreRange) -> Vec<Bytes> {
        let mut update = [HEAD; MAX_LEVEL];
        let mut x = HEAD;

        for i in (0..self.level).rev() {
            while let Some(next) = self.forward(x, i) {
                if range.gte_min(self.nodes[next].score) {
                    break;
                }
                x = next;
            }
            update[i] = x;
        }

        let mut removed = Vec::new();
        let mut cursor = self.forward(x, 0);
        while let Some(node) = cursor {
            if !range.lte_max(self.nodes[node].score) {
                break;
            }
            cursor = self.forward(node, 0);
            removed.push(self.unlink(node, &update).member);
        }

        removed
    }

    pub fn remove_range_by_lex(&mut self, range: &LexRange) -> Vec<Bytes> {
        let mut update = [HEAD; MAX_LEVEL];
        let mut x = HEAD;

        for i in (0..self.level).rev() {
            while let Some(next) = self.forward(x, i) {
                if range.gte_min(&self.nodes[next].member) {
                    break;
                }
                x = next;
            }
            update[i] = x;
        }

        let mut removed = Vec::new();
        let mut cursor = self.forward(x, 0);
        while let Some(node) = cursor {
            if !range.lte_max(&self.nodes[node].member) {
                break;
            }
            cursor = self.forward(node, 0);
            removed.push(self.unlink(node, &update).member);
        }

        removed
    }

    fn forward(&self, x: usize, level: usize) -> Option<usize> {
        self.nodes[x].links[level].forward
    }

    // Whether node `x` sorts strictly before `(score, member)`.
    fn precedes(&self, x: usize, score: f64, member: &[u8]) -> bool {
        let node = &self.nodes[x];
        cmp_entry(node.score, &node.member, score, member) == Ordering::Less
    }

    fn is_entry(&self, x: usize, score: f64, member: &[u8]) -> bool {
        let node = &self.nodes[x];
        node.score == score && node.member.as_ref() == member
    }

    // For every level, the last node that sorts before `(score, member)`.
    fn search(&self, score: f64, member: &[u8]) -> [usize; MAX_LEVEL] {
        let mut update = [HEAD; MAX_LEVEL];
        let mut x = HEAD;

        for i in (0..self.level).rev() {
            while let Some(next) = self.forward(x, i) {
                if !self.precedes(next, score, member) {
                    break;
                }
                x = next;
            }
            update[i] = x;
        }

        update
    }

    fn node_at(&self, rank: usize) -> Option<usize> {
        let target = rank + 1;
        let mut traversed = 0;
        let mut x = HEAD;

        for i in (0..self.level).rev() {
            while let Some(next) = self.forward(x, i) {
                let span = self.nodes[x].links[i].span;
                if traversed + span > target {
                    break;
                }
                traversed += span;
                x = next;
            }

            if traversed == target {
                return Some(x);
            }
        }

        None
    }

    fn rank_of(&self, x: usize) -> Option<usize> {
        let node = &self.nodes[x];
        self.rank(node.score, &node.member)
    }

    fn count_between(&self, first: Option<usize>, last: Option<usize>) -> usize {
        let (Some(first), Some(last)) = (first, last) else {
            return 0;
        };

        match (self.rank_of(first), self.rank_of(last)) {
            (Some(first), Some(last)) if last >= first => last - first + 1,
            _ => 0,
        }
    }

    fn first_in_score_range(&self, range: &ScoreRange) -> Option<usize> {
        let mut x = HEAD;
        for i in (0..self.level).rev() {
            while let Some(next) = self.forward(x, i) {
                if range.gte_min(self.nodes[next].score) {
                    break;
                }
                x = next;
            }
        }

        let x = self.forward(x, 0)?;
        range.lte_max(self.nodes[x].score).then_some(x)
    }

    fn last_in_score_range(&self, range: &ScoreRange) -> Option<usize> {
        let mut x = HEAD;
        for i in (0..self.level).rev() {
            while let Some(next) = self.forward(x, i) {
                if !range.lte_max(self.nodes[next].score) {
                    break;
                }
                x = next;
            }
        }

        (x != HEAD && range.gte_min(self.nodes[x].score)).then_some(x)
    }

    fn first_in_lex_range(&self, range: &LexRange) -> Option<usize> {
        let mut x = HEAD;
        for i in (0..self.level).rev() {
            while let Some(next) = self.forward(x, i) {
                if range.gte_min(&self.nodes[next].member) {
                    break;
                }
                x = next;
            }
        }

        let x = self.forward(x, 0)?;
        range.lte_max(&self.nodes[x].member).then_some(x)
    }

    fn last_in_lex_range(&self, range: &LexRange) -> Option<usize> {
        let mut x = HEAD;
        for i in (0..self.level).rev() {
            while let Some(next) = self.forward(x, i) {
                if !range.lte_max(&self.nodes[next].member) {
                    break;
                }
                x = next;
            }
        }

        (x != HEAD && range.gte_min(&self.nodes[x].member)).then_some(x)
    }

    fn unlink(&mut self, x: usize, update: &[usize; MAX_LEVEL]) -> Node {
        for (i, prev) in update.iter().enumerate().take(self.level) {
            let removed = self.nodes[x].links.get(i).copied();
            let link = &mut self.nodes[*prev].links[i];

            match removed {
                Some(removed) if link.forward == Some(x) => {
                    link.span = link.span + removed.span - 1;
                    link.forward = removed.forward;
                }
                _ => link.span -= 1,
            }
        }

        let backward = self.nodes[x].backward;
        match self.nodes[x].links[0].forward {
            Some(next) => self.nodes[next].backward = backward,
            None => self.tail = backward,
        }

        while self.level > 1 && self.nodes[HEAD].links[self.level - 1].forward.is_none() {
            self.level -= 1;
        }

        self.len -= 1;
        self.release(x)
    }

    fn alloc(&mut self, score: f64, member: Bytes, level: usize) -> usize {
        let node = Node::new(score, member, level);

        match self.free.pop() {
            Some(x) => {
                self.nodes[x] = node;
                x
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    fn release(&mut self, x: usize) -> Node {
        self.free.push(x);
        std::mem::replace(&mut self.nodes[x], Node::new(0.0, Bytes::new(), 0))
    }
}

fn random_level() -> usize {
    let mut rng = rand::thread_rng();
    let mut level = 1;
    while level < MAX_LEVEL && rng.gen_bool(PROMOTION) {
        level += 1;
    }
    level
}

pub struct Iter<'a> {
    list: &'a SkipList,
    cursor: Option<usize>,
    order: Order,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a Bytes, f64);

    fn next(&mut self) -> Option<Self::Item> {
        let node = &self.list.nodes[self.cursor?];
        self.cursor = match self.order {
            Order::Ascending => node.links[0].forward,
            Order::Descending => node.backward,
        };

        Some((&node.member, node.score))
    }
}
