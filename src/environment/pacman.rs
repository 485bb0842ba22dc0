use super::Environment;
use crate::Action;
use crate::Percept;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::collections::HashSet;
use std::collections::VecDeque;

/// north, east, south, west; row 0 is the top of the maze
const DIRECTIONS: [(i64, i64); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

const MOVE_COST: i64 = -1;
const WALL_PENALTY: i64 = -10;
const FOOD_REWARD: i64 = 10;
const GHOST_BOUNTY: i64 = 30;
const DEATH_PENALTY: i64 = -50;
const COMPLETE_BONUS: i64 = 100;

/// shifts the worst possible cycle into the unsigned domain
const OFFSET: i64 = 60;

const PILL_DURATION: u32 = 40;
const HUNT_RANGE: u32 = 5;
const PURSUIT_TIME: u32 = 10;
const COOLDOWN_TIME: u32 = 10;
const SCENT_RANGE: u32 = 4;

/// `#` wall, `.` floor (half of which grows food on reset), `P` start,
/// `G` ghost, `o` power pill
const MAZE: &str = "###############\n\
                    #P....#.#....o#\n\
                    #.###.#.#.###.#\n\
                    #.....G.G.....#\n\
                    #.###.###.###.#\n\
                    #......#......#\n\
                    #.###.###.###.#\n\
                    #.....G.#.....#\n\
                    #.###.#.#.###.#\n\
                    #o....#.#.....#\n\
                    ###############";

#[derive(Clone, Copy, PartialEq, Eq)]
enum Tile {
    Wall,
    Empty,
    Food,
    Pill,
}

struct Ghost {
    x: i64,
    y: i64,
    pursue: u32,
    cooldown: u32,
    alive: bool,
}

impl Ghost {
    fn at(x: i64, y: i64) -> Self {
        Self {
            x,
            y,
            pursue: 0,
            cooldown: 0,
            alive: true,
        }
    }
}

/// A pacman round reduced to a reactive percept: the agent never sees the
/// maze, only a 16-bit sensor word (wall adjacency, food line-of-sight,
/// power state, food smell by distance, ghost line-of-sight) and a shifted
/// reward. Death or a cleared maze resets the world in place.
pub struct Pacman {
    tiles: Vec<Vec<Tile>>,
    ghosts: Vec<Ghost>,
    width: i64,
    height: i64,
    x: i64,
    y: i64,
    power: u32,
    food_left: u32,
    observation: Percept,
    signed_reward: i64,
    rng: SmallRng,
}

impl Pacman {
    pub fn new(seed: u64) -> Self {
        let mut world = Self {
            tiles: Vec::new(),
            ghosts: Vec::new(),
            width: 0,
            height: 0,
            x: 0,
            y: 0,
            power: 0,
            food_left: 0,
            observation: 0,
            signed_reward: 0,
            rng: SmallRng::seed_from_u64(seed),
        };
        world.reset();
        world.observation = world.observe();
        world
    }

    /// rebuild the maze, reseat everyone, regrow food on half the floor
    fn reset(&mut self) {
        self.tiles.clear();
        self.ghosts.clear();
        self.food_left = 0;
        self.power = 0;
        for (y, row) in MAZE.lines().enumerate() {
            let mut tiles = Vec::new();
            for (x, glyph) in row.trim().chars().enumerate() {
                let tile = match glyph {
                    '#' => Tile::Wall,
                    'o' => Tile::Pill,
                    'P' => {
                        self.x = x as i64;
                        self.y = y as i64;
                        Tile::Empty
                    }
                    'G' => {
                        self.ghosts.push(Ghost::at(x as i64, y as i64));
                        Tile::Empty
                    }
                    _ => {
                        if self.rng.random_range(0..2) == 1 {
                            self.food_left += 1;
                            Tile::Food
                        } else {
                            Tile::Empty
                        }
                    }
                };
                tiles.push(tile);
            }
            self.tiles.push(tiles);
        }
        self.height = self.tiles.len() as i64;
        self.width = self.tiles[0].len() as i64;
    }

    /// coordinates wrap, so open edges behave as tunnels
    fn wrap(&self, x: i64, y: i64) -> (i64, i64) {
        (x.rem_euclid(self.width), y.rem_euclid(self.height))
    }

    fn tile(&self, x: i64, y: i64) -> Tile {
        self.tiles[y as usize][x as usize]
    }

    fn open(&self, x: i64, y: i64) -> bool {
        self.tile(x, y) != Tile::Wall
    }

    fn ghost_at(&self, x: i64, y: i64) -> bool {
        self.ghosts.iter().any(|g| g.alive && g.x == x && g.y == y)
    }

    /// first step of a shortest open path from (x, y) to pacman, if one
    /// exists within hunting range
    fn chase(&self, x: i64, y: i64) -> Option<(i64, i64)> {
        let mut seen = HashSet::from([(x, y)]);
        let mut frontier = VecDeque::new();
        for &(dx, dy) in &DIRECTIONS {
            let (nx, ny) = self.wrap(x + dx, y + dy);
            if self.open(nx, ny) && seen.insert((nx, ny)) {
                frontier.push_back((nx, ny, (dx, dy), 1));
            }
        }
        while let Some((cx, cy, first, depth)) = frontier.pop_front() {
            if (cx, cy) == (self.x, self.y) {
                return Some(first);
            }
            if depth == HUNT_RANGE {
                continue;
            }
            for (dx, dy) in DIRECTIONS {
                let (nx, ny) = self.wrap(cx + dx, cy + dy);
                if self.open(nx, ny) && seen.insert((nx, ny)) {
                    frontier.push_back((nx, ny, first, depth + 1));
                }
            }
        }
        None
    }

    fn wander(&mut self, x: i64, y: i64) -> (i64, i64) {
        let moves = DIRECTIONS
            .into_iter()
            .filter(|&(dx, dy)| {
                let (nx, ny) = self.wrap(x + dx, y + dy);
                self.open(nx, ny)
            })
            .collect::<Vec<_>>();
        match moves.len() {
            0 => (0, 0),
            n => moves[self.rng.random_range(0..n)],
        }
    }

    /// walking distance to the nearest food, if any lies within smelling
    /// range
    fn scent(&self) -> Option<u32> {
        let mut seen = HashSet::from([(self.x, self.y)]);
        let mut frontier = VecDeque::from([(self.x, self.y, 0)]);
        while let Some((x, y, depth)) = frontier.pop_front() {
            if self.tile(x, y) == Tile::Food {
                return Some(depth);
            }
            if depth == SCENT_RANGE {
                continue;
            }
            for (dx, dy) in DIRECTIONS {
                let (nx, ny) = self.wrap(x + dx, y + dy);
                if self.open(nx, ny) && seen.insert((nx, ny)) {
                    frontier.push_back((nx, ny, depth + 1));
                }
            }
        }
        None
    }

    fn sees_food(&self, dx: i64, dy: i64) -> bool {
        self.sights(dx, dy, |world, x, y| world.tile(x, y) == Tile::Food)
    }

    fn sees_ghost(&self, dx: i64, dy: i64) -> bool {
        self.sights(dx, dy, |world, x, y| world.ghost_at(x, y))
    }

    /// walk a straight corridor until a wall (or a full lap of the maze)
    fn sights(&self, dx: i64, dy: i64, spot: impl Fn(&Self, i64, i64) -> bool) -> bool {
        let (mut x, mut y) = (self.x, self.y);
        for _ in 0..self.width.max(self.height) {
            (x, y) = self.wrap(x + dx, y + dy);
            if !self.open(x, y) {
                return false;
            }
            if spot(self, x, y) {
                return true;
            }
        }
        false
    }

    fn observe(&self) -> Percept {
        let mut bits = 0;
        for (i, &(dx, dy)) in DIRECTIONS.iter().enumerate() {
            let (nx, ny) = self.wrap(self.x + dx, self.y + dy);
            if self.open(nx, ny) {
                bits |= 1 << i;
            }
            if self.sees_food(dx, dy) {
                bits |= 1 << (4 + i);
            }
            if self.sees_ghost(dx, dy) {
                bits |= 1 << (12 + i);
            }
        }
        if self.power > 0 {
            bits |= 1 << 8;
        }
        match self.scent() {
            Some(d) if d <= 2 => bits |= 0b111 << 9,
            Some(d) if d <= 3 => bits |= 0b11 << 10,
            Some(_) => bits |= 0b1 << 11,
            None => {}
        }
        bits
    }

    /// pacman dies: take the penalty and rebuild the world
    fn die(&mut self) {
        self.signed_reward += DEATH_PENALTY;
        self.reset();
        self.observation = self.observe();
    }
}

impl Environment for Pacman {
    fn perform_action(&mut self, action: Action) {
        self.signed_reward = 0;
        let (dx, dy) = DIRECTIONS[(action as usize).min(3)];
        let (nx, ny) = self.wrap(self.x + dx, self.y + dy);
        if !self.open(nx, ny) {
            self.signed_reward += WALL_PENALTY;
        } else {
            self.signed_reward += MOVE_COST;
            self.x = nx;
            self.y = ny;
            if self.ghost_at(nx, ny) {
                if self.power > 0 {
                    let mut eaten = 0;
                    for ghost in &mut self.ghosts {
                        if ghost.alive && ghost.x == nx && ghost.y == ny {
                            ghost.alive = false;
                            eaten += 1;
                        }
                    }
                    self.signed_reward += GHOST_BOUNTY * eaten;
                } else {
                    self.die();
                    return;
                }
            }
            match self.tile(nx, ny) {
                Tile::Food => {
                    self.signed_reward += FOOD_REWARD;
                    self.tiles[ny as usize][nx as usize] = Tile::Empty;
                    self.food_left -= 1;
                    if self.food_left == 0 {
                        self.signed_reward += COMPLETE_BONUS;
                        self.reset();
                        self.observation = self.observe();
                        return;
                    }
                }
                Tile::Pill => {
                    self.power = PILL_DURATION;
                    self.tiles[ny as usize][nx as usize] = Tile::Empty;
                }
                _ => {}
            }
        }
        for i in 0..self.ghosts.len() {
            if !self.ghosts[i].alive {
                continue;
            }
            let (gx, gy) = (self.ghosts[i].x, self.ghosts[i].y);
            let cooled = self.ghosts[i].cooldown == 0;
            let step = if cooled { self.chase(gx, gy) } else { None };
            {
                let ghost = &mut self.ghosts[i];
                if !cooled {
                    ghost.cooldown -= 1;
                } else if ghost.pursue > 0 {
                    ghost.pursue -= 1;
                    if ghost.pursue == 0 {
                        ghost.cooldown = COOLDOWN_TIME;
                    }
                } else if step.is_some() {
                    ghost.pursue = PURSUIT_TIME;
                }
            }
            let (dx, dy) = match step {
                Some(step) => step,
                None => self.wander(gx, gy),
            };
            let (nx, ny) = self.wrap(gx + dx, gy + dy);
            if (nx, ny) == (self.x, self.y) {
                if self.power > 0 {
                    self.ghosts[i].alive = false;
                    continue;
                } else {
                    self.die();
                    return;
                }
            }
            self.ghosts[i].x = nx;
            self.ghosts[i].y = ny;
        }
        if self.power > 0 {
            self.power -= 1;
        }
        self.observation = self.observe();
    }

    fn observation(&self) -> Percept {
        self.observation
    }

    fn reward(&self) -> Percept {
        let outcome = self.signed_reward + OFFSET;
        let clamped = outcome.clamp(0, 255);
        if clamped != outcome {
            log::warn!("outcome {} exceeds 8 bits, clamping to {}", outcome, clamped);
        }
        clamped as Percept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_maze_well_formed() {
        let world = Pacman::new(113);
        assert!(world.tiles.iter().all(|row| row.len() == world.width as usize));
        assert!((0..world.width).all(|x| world.tile(x, 0) == Tile::Wall));
        assert!((0..world.width).all(|x| world.tile(x, world.height - 1) == Tile::Wall));
        assert_eq!(world.ghosts.len(), 3);
        assert!(world.open(world.x, world.y));
        assert!(world.food_left > 0);
    }

    #[test]
    fn is_percept_inside_its_widths() {
        let mut world = Pacman::new(127);
        for turn in 0..500u64 {
            world.perform_action(turn % 4);
            assert!(world.observation() < 1 << 16);
            assert!(world.reward() < 1 << 8);
        }
    }

    #[test]
    fn is_wall_bump_fruitless() {
        let mut world = Pacman::new(131);
        // the start square sits under the top border
        world.perform_action(0);
        assert_eq!(world.reward(), (WALL_PENALTY + OFFSET) as Percept);
    }

    #[test]
    fn is_world_reproducible() {
        let mut a = Pacman::new(137);
        let mut b = Pacman::new(137);
        for turn in 0..200u64 {
            a.perform_action((turn * 7) % 4);
            b.perform_action((turn * 7) % 4);
            assert_eq!(a.observation(), b.observation());
            assert_eq!(a.reward(), b.reward());
        }
    }

    #[test]
    fn is_sensor_word_coherent_at_start() {
        let world = Pacman::new(139);
        // boxed in by the corner: north and west closed, east and south open
        assert_eq!(world.observation() & 0b1111, 0b0110);
    }
}
