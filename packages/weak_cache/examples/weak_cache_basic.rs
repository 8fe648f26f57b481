//! Example demonstrating a cache that only keeps values around while they are in use.

use weak_cache::{Cached, WeakCache};

struct Texture {
    name: String,
}

impl Drop for Texture {
    fn drop(&mut self) {
        println!("Unloading texture {}", self.name);
    }
}

fn main() {
    println!("=== weak_cache: shared while in use ===");

    let cache = WeakCache::new(|name: &String| {
        println!("Loading texture {name}");
        Texture { name: name.clone() }
    });

    let grass = cache.get(&"grass".to_string());
    let more_grass = cache.get(&"grass".to_string());
    let stone = cache.get(&"stone".to_string());

    println!("Same grass texture: {}", Cached::ptr_eq(&grass, &more_grass));
    println!("Textures in use: {}", cache.len());

    println!("Dropping all handles to the grass texture:");
    drop(grass);
    drop(more_grass);
    println!("Textures in use: {}", cache.len());

    println!("Requesting grass again:");
    let grass = cache.get(&"grass".to_string());
    println!("Loaded {} and {}", grass.name, stone.name);
}
