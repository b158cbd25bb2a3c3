use crate::core::cart::CartStore;
use crate::core::catalog::{Catalog, FilterCriteria};
use crate::core::input::{InputError, InputHandler, InputProvider};
use crate::core::models::{Product, format_money};
use crate::core::storage::SlotStore;

/// One terminal storefront session.
///
/// Holds the catalog, the transient filter criteria, the cart panel flag and
/// the cart store. Each public intent maps onto exactly one core operation;
/// `run` only reads lines and dispatches.
pub struct Storefront<S: SlotStore, I: InputProvider> {
    catalog: Catalog,
    criteria: FilterCriteria,
    cart: CartStore<S>,
    cart_open: bool,
    input: InputHandler<I>,
}

impl<S: SlotStore, I: InputProvider> Storefront<S, I> {
    pub fn new(catalog: Catalog, cart: CartStore<S>, input_provider: I) -> Self {
        Self {
            catalog,
            criteria: FilterCriteria::default(),
            cart,
            cart_open: false,
            input: InputHandler::new(input_provider),
        }
    }

    // ── Intents ──────────────────────────────────────────────

    pub fn search_changed(&mut self, text: &str) {
        self.criteria.set_search(text);
    }

    pub fn artist_selected(&mut self, artist: &str) {
        self.criteria.set_artist(artist);
    }

    pub fn max_price_changed(&mut self, raw: &str) {
        self.criteria.set_max_price_input(raw);
    }

    pub fn clear_filters(&mut self) {
        self.criteria.clear();
    }

    /// Unknown product ids are ignored; returns whether anything was added.
    pub fn add_product(&mut self, id: u32) -> bool {
        match self.catalog.get(id) {
            Some(product) => {
                self.cart.add(product);
                true
            }
            None => false,
        }
    }

    pub fn remove_line(&mut self, id: u32) -> bool {
        self.cart.remove(id)
    }

    pub fn change_qty(&mut self, id: u32, raw: &str) -> bool {
        self.cart.set_qty_input(id, raw)
    }

    pub fn open_cart(&mut self) {
        self.cart_open = true;
    }

    pub fn close_cart(&mut self) {
        self.cart_open = false;
    }

    // ── Read views ───────────────────────────────────────────

    pub fn visible_products(&self) -> Vec<&Product> {
        self.catalog.filter(&self.criteria)
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn cart(&self) -> &CartStore<S> {
        &self.cart
    }

    pub fn is_cart_open(&self) -> bool {
        self.cart_open
    }

    // ── Terminal loop ────────────────────────────────────────

    /// Runs until the user exits or input closes.
    pub fn run(&mut self) {
        println!("== VINILO STORE ==");

        loop {
            let result = if self.is_cart_open() {
                self.cart_panel_step()
            } else {
                self.catalog_step()
            };
            match result {
                Ok(true) => continue,
                Ok(false) => break,
                Err(InputError::Closed) => break,
                Err(e) => eprintln!("Input error: {e}"),
            }
        }
        println!("Cart saved. Goodbye!");
    }

    fn catalog_step(&mut self) -> Result<bool, InputError> {
        self.print_products();
        println!(
            "\n[1] Search  [2] Artist  [3] Max price  [4] Clear filters  [5] Add to cart  [6] Cart ({})  [0] Exit",
            self.cart.item_count()
        );
        let choice = self.input.get_string_trimmed("Selection: ")?;

        match choice.as_str() {
            "1" => {
                let text = self.input.get_string("Search: ")?;
                self.search_changed(&text);
            }
            "2" => self.artist_flow()?,
            "3" => {
                let raw = self.input.get_string_trimmed("Max price (0 - 2000): ")?;
                self.max_price_changed(&raw);
            }
            "4" => self.clear_filters(),
            "5" => self.add_flow()?,
            "6" => self.open_cart(),
            "0" => return Ok(false),
            _ => println!("Invalid selection, please try again."),
        }
        Ok(true)
    }

    fn cart_panel_step(&mut self) -> Result<bool, InputError> {
        self.print_cart();
        println!("\n[1] Change quantity  [2] Remove  [0] Close cart");
        let choice = self.input.get_string_trimmed("Selection: ")?;

        match choice.as_str() {
            "1" => {
                if let Some(id) = self.pick_line("Line #: ")? {
                    let raw = self.input.get_string_trimmed("Quantity: ")?;
                    self.change_qty(id, &raw);
                }
            }
            "2" => {
                if let Some(id) = self.pick_line("Remove line #: ")? {
                    self.remove_line(id);
                }
            }
            "0" => self.close_cart(),
            _ => println!("Invalid selection, please try again."),
        }
        Ok(true)
    }

    fn artist_flow(&mut self) -> Result<(), InputError> {
        let artists: Vec<String> = self.catalog.artists().into_iter().map(String::from).collect();
        println!("  [0] All");
        for (i, a) in artists.iter().enumerate() {
            println!("  [{}] {a}", i + 1);
        }
        let raw = self.input.get_string_trimmed("Artist #: ")?;
        if raw == "0" {
            self.artist_selected("");
            return Ok(());
        }
        match raw.parse::<usize>() {
            Ok(v) if v >= 1 && v <= artists.len() => self.artist_selected(&artists[v - 1]),
            _ => println!("Invalid selection."),
        }
        Ok(())
    }

    fn add_flow(&mut self) -> Result<(), InputError> {
        let visible: Vec<u32> = self.visible_products().iter().map(|p| p.id).collect();
        if visible.is_empty() {
            println!("No products found.");
            return Ok(());
        }
        match self.input.pick("Add product #: ", visible.len())? {
            Some(idx) => {
                self.add_product(visible[idx]);
                if let Some(line) = self.cart.get(visible[idx]) {
                    println!("Added: {} (x{})", line.title, line.qty);
                }
            }
            None => println!("Invalid selection."),
        }
        Ok(())
    }

    fn pick_line(&mut self, prompt: &str) -> Result<Option<u32>, InputError> {
        if self.cart.is_empty() {
            println!("Your cart is empty.");
            return Ok(None);
        }
        let picked = self.input.pick(prompt, self.cart.len())?;
        if picked.is_none() {
            println!("Invalid selection.");
        }
        Ok(picked.map(|idx| self.cart.items()[idx].id))
    }

    fn print_products(&self) {
        let c = self.criteria();
        if !c.is_default() {
            let artist = if c.artist_filter.is_empty() { "All" } else { c.artist_filter.as_str() };
            println!(
                "\nFilters: search '{}' | artist {} | max ${}",
                c.search_text, artist, c.max_price
            );
        }
        let products = self.visible_products();
        if products.is_empty() {
            println!("\nNo products found.");
            return;
        }
        println!();
        for (i, p) in products.iter().enumerate() {
            println!(
                "  {}. {} — {} ${}\n     {}",
                i + 1,
                p.title,
                p.artist,
                format_money(p.price),
                p.description
            );
        }
    }

    fn print_cart(&self) {
        println!("\n--- Your cart ---");
        if self.cart.is_empty() {
            println!("  Your cart is empty.");
        }
        for (i, line) in self.cart.items().iter().enumerate() {
            println!(
                "  {}. {} — {}  x{}  ${}",
                i + 1,
                line.title,
                line.artist,
                line.qty,
                format_money(line.subtotal())
            );
        }
        println!("  Total: ${}", format_money(self.cart.total()));
        if self.cart.can_checkout() {
            println!("  Checkout is not available in this store.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::tests::MockProvider;
    use crate::core::storage::MemorySlot;
    use rust_decimal::Decimal;

    fn storefront(lines: &[&str]) -> Storefront<MemorySlot, MockProvider> {
        Storefront::new(
            Catalog::builtin(),
            CartStore::open(MemorySlot::new()),
            MockProvider::new(lines),
        )
    }

    fn visible_ids<S: SlotStore, I: InputProvider>(s: &Storefront<S, I>) -> Vec<u32> {
        s.visible_products().iter().map(|p| p.id).collect()
    }

    #[test]
    fn test_intents_drive_filter() {
        let mut s = storefront(&[]);
        assert_eq!(visible_ids(&s), vec![1, 2, 3, 4]);

        s.artist_selected("Pink Floyd");
        assert_eq!(visible_ids(&s), vec![2]);

        s.clear_filters();
        s.max_price_changed("22");
        assert_eq!(visible_ids(&s), vec![3, 4]);

        s.clear_filters();
        s.search_changed("ROAD");
        assert_eq!(visible_ids(&s), vec![1]);

        s.clear_filters();
        assert!(s.criteria().is_default());
    }

    #[test]
    fn test_intents_drive_cart() {
        let mut s = storefront(&[]);
        assert!(s.add_product(1));
        assert!(s.add_product(1));
        assert!(!s.add_product(99));
        assert!(s.add_product(3));

        assert_eq!(s.cart().item_count(), 3);
        assert_eq!(s.cart().items()[0].id, 3);

        assert!(s.change_qty(1, "0"));
        assert_eq!(s.cart().get(1).unwrap().qty, 1);

        assert!(s.remove_line(3));
        assert!(!s.remove_line(3));
        assert_eq!(s.cart().total(), Decimal::new(2999, 2));
    }

    #[test]
    fn test_cart_panel_toggle() {
        let mut s = storefront(&[]);
        assert!(!s.is_cart_open());
        s.open_cart();
        assert!(s.is_cart_open());
        s.close_cart();
        assert!(!s.is_cart_open());
    }

    #[test]
    fn test_scripted_session() {
        // Filter to AC/DC, add it twice, open the cart, set qty to 5,
        // close, clear, add Abbey Road, exit.
        let mut s = storefront(&[
            "2", "3", // artist #3 = AC/DC
            "5", "1", // add first visible
            "5", "1",
            "6", // open cart
            "1", "1", "5", // line 1 qty 5
            "0", // close cart
            "4", // clear filters
            "5", "1", // add Abbey Road
            "0",
        ]);
        s.run();

        assert!(!s.is_cart_open());
        assert!(s.criteria().is_default());
        let ids: Vec<u32> = s.cart().items().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(s.cart().get(3).unwrap().qty, 5);
        assert_eq!(s.cart().item_count(), 6);
    }

    #[test]
    fn test_session_ends_when_input_closes() {
        let mut s = storefront(&["1", "beatles", "5", "1"]);
        s.run();
        assert_eq!(s.criteria().search_text, "beatles");
        assert_eq!(s.cart().items()[0].id, 1);
    }

    #[test]
    fn test_remove_from_panel() {
        let mut s = storefront(&["5", "1", "5", "2", "6", "2", "1", "2", "9"]);
        s.run();
        // Line 1 was Dark Side (newest first), so Abbey Road remains.
        let ids: Vec<u32> = s.cart().items().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1]);
        assert!(s.is_cart_open());
    }
}
