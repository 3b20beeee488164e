//! In-memory repositories for service tests.

use async_trait::async_trait;
use folio_core::{
    Book, BookId, BookRecommendation, Category, CategoryId, FolioResult, Interaction,
    InteractionId, InteractionType, Page, PageRequest, RecommendationId, User, UserId,
    UserPreference,
};
use folio_repository::{
    BookRepository, BookSearchCriteria, CategoryRepository, InteractionRepository,
    PreferenceRepository, RecommendationFilter, RecommendationRepository, UserRepository,
};
use folio_security::PasswordHasherInterface;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

fn page<T: Clone>(items: &[T], skip: u32, limit: u32) -> Vec<T> {
    items.iter().skip(skip as usize).take(limit as usize).cloned().collect()
}

/// Counts how often each repository method ran.
#[derive(Default)]
pub struct CallCounter(Mutex<HashMap<&'static str, usize>>);

impl CallCounter {
    pub fn hit(&self, method: &'static str) {
        *self.0.lock().unwrap().entry(method).or_default() += 1;
    }

    pub fn count(&self, method: &'static str) -> usize {
        self.0.lock().unwrap().get(method).copied().unwrap_or(0)
    }
}

#[derive(Default)]
pub struct MockUserRepository {
    pub users: Mutex<HashMap<UserId, User>>,
    pub calls: CallCounter,
}

impl MockUserRepository {
    pub fn add(&self, user: User) {
        self.users.lock().unwrap().insert(user.id, user);
    }

    pub fn get(&self, id: UserId) -> Option<User> {
        self.users.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn find_by_id(&self, id: UserId) -> FolioResult<Option<User>> {
        self.calls.hit("find_by_id");
        Ok(self.get(id))
    }

    async fn find_by_username(&self, username: &str) -> FolioResult<Option<User>> {
        self.calls.hit("find_by_username");
        Ok(self.users.lock().unwrap().values().find(|u| u.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> FolioResult<Option<User>> {
        self.calls.hit("find_by_email");
        let email = email.trim().to_lowercase();
        Ok(self.users.lock().unwrap().values().find(|u| u.email.as_str() == email).cloned())
    }

    async fn exists_by_username(&self, username: &str) -> FolioResult<bool> {
        Ok(self.users.lock().unwrap().values().any(|u| u.username == username))
    }

    async fn exists_by_email(&self, email: &str) -> FolioResult<bool> {
        let email = email.trim().to_lowercase();
        Ok(self.users.lock().unwrap().values().any(|u| u.email.as_str() == email))
    }

    async fn find_all(&self, request: PageRequest) -> FolioResult<Page<User>> {
        self.calls.hit("find_all");
        let mut users: Vec<User> = self.users.lock().unwrap().values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        let total = users.len() as u64;
        let content = page(&users, request.offset(), request.size);
        Ok(Page::new(content, request, total))
    }

    async fn save(&self, user: &User) -> FolioResult<User> {
        self.add(user.clone());
        Ok(user.clone())
    }

    async fn update(&self, user: &User) -> FolioResult<User> {
        self.add(user.clone());
        Ok(user.clone())
    }

    async fn delete(&self, id: UserId) -> FolioResult<bool> {
        Ok(self.users.lock().unwrap().remove(&id).is_some())
    }
}

#[derive(Default)]
pub struct MockPreferenceRepository {
    pub preferences: Mutex<HashMap<UserId, UserPreference>>,
    pub calls: CallCounter,
}

#[async_trait]
impl PreferenceRepository for MockPreferenceRepository {
    async fn find_by_user(&self, user_id: UserId) -> FolioResult<Option<UserPreference>> {
        self.calls.hit("find_by_user");
        Ok(self.preferences.lock().unwrap().get(&user_id).cloned())
    }

    async fn save(&self, preference: &UserPreference) -> FolioResult<UserPreference> {
        self.preferences.lock().unwrap().insert(preference.user_id, preference.clone());
        Ok(preference.clone())
    }

    async fn update(&self, preference: &UserPreference) -> FolioResult<UserPreference> {
        self.save(preference).await
    }
}

#[derive(Default)]
pub struct MockCategoryRepository {
    pub categories: Mutex<HashMap<CategoryId, Category>>,
    /// Book counts reported by `count_books` and `find_popular`.
    pub book_counts: Mutex<HashMap<CategoryId, u64>>,
    pub calls: CallCounter,
}

impl MockCategoryRepository {
    pub fn add(&self, category: Category) {
        self.categories.lock().unwrap().insert(category.id, category);
    }

    fn sorted(&self) -> Vec<Category> {
        let mut categories: Vec<Category> = self.categories.lock().unwrap().values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        categories
    }
}

#[async_trait]
impl CategoryRepository for MockCategoryRepository {
    async fn find_by_id(&self, id: CategoryId) -> FolioResult<Option<Category>> {
        self.calls.hit("find_by_id");
        Ok(self.categories.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> FolioResult<Option<Category>> {
        self.calls.hit("find_by_name");
        Ok(self.categories.lock().unwrap().values().find(|c| c.name == name).cloned())
    }

    async fn find_all(&self, skip: u32, limit: u32) -> FolioResult<Vec<Category>> {
        self.calls.hit("find_all");
        Ok(page(&self.sorted(), skip, limit))
    }

    async fn find_by_ids(&self, ids: &[CategoryId]) -> FolioResult<Vec<Category>> {
        Ok(self.sorted().into_iter().filter(|c| ids.contains(&c.id)).collect())
    }

    async fn save(&self, category: &Category) -> FolioResult<Category> {
        self.add(category.clone());
        Ok(category.clone())
    }

    async fn update(&self, category: &Category) -> FolioResult<Category> {
        self.add(category.clone());
        Ok(category.clone())
    }

    async fn delete(&self, id: CategoryId) -> FolioResult<bool> {
        Ok(self.categories.lock().unwrap().remove(&id).is_some())
    }

    async fn count_books(&self, id: CategoryId) -> FolioResult<u64> {
        self.calls.hit("count_books");
        Ok(self.book_counts.lock().unwrap().get(&id).copied().unwrap_or(0))
    }

    async fn find_popular(&self, limit: u32) -> FolioResult<Vec<(Category, u64)>> {
        let counts = self.book_counts.lock().unwrap().clone();
        let mut popular: Vec<(Category, u64)> = self
            .sorted()
            .into_iter()
            .map(|c| {
                let count = counts.get(&c.id).copied().unwrap_or(0);
                (c, count)
            })
            .collect();
        popular.sort_by(|a, b| b.1.cmp(&a.1));
        popular.truncate(limit as usize);
        Ok(popular)
    }
}

#[derive(Default)]
pub struct MockBookRepository {
    pub books: Mutex<HashMap<BookId, Book>>,
    pub links: Mutex<HashMap<BookId, Vec<CategoryId>>>,
    /// Categories known to the catalog, for `categories_for_books`.
    pub categories: Mutex<HashMap<CategoryId, Category>>,
    pub calls: CallCounter,
}

impl MockBookRepository {
    pub fn add(&self, book: Book) {
        self.books.lock().unwrap().insert(book.id, book);
    }

    pub fn add_category(&self, category: Category) {
        self.categories.lock().unwrap().insert(category.id, category);
    }

    pub fn get(&self, id: BookId) -> Option<Book> {
        self.books.lock().unwrap().get(&id).cloned()
    }

    fn sorted(&self) -> Vec<Book> {
        let mut books: Vec<Book> = self.books.lock().unwrap().values().cloned().collect();
        books.sort_by(|a, b| a.title.cmp(&b.title));
        books
    }

    fn linked_to(&self, book_id: BookId, category_id: CategoryId) -> bool {
        self.links
            .lock()
            .unwrap()
            .get(&book_id)
            .is_some_and(|ids| ids.contains(&category_id))
    }
}

#[async_trait]
impl BookRepository for MockBookRepository {
    async fn find_by_id(&self, id: BookId) -> FolioResult<Option<Book>> {
        self.calls.hit("find_by_id");
        Ok(self.get(id))
    }

    async fn exists_by_isbn(&self, isbn: &str) -> FolioResult<bool> {
        Ok(self.books.lock().unwrap().values().any(|b| b.isbn.as_deref() == Some(isbn)))
    }

    async fn find_all(&self, skip: u32, limit: u32) -> FolioResult<Vec<Book>> {
        self.calls.hit("find_all");
        Ok(page(&self.sorted(), skip, limit))
    }

    async fn search(
        &self,
        criteria: &BookSearchCriteria,
        skip: u32,
        limit: u32,
    ) -> FolioResult<Vec<Book>> {
        self.calls.hit("search");
        let matching: Vec<Book> = self
            .sorted()
            .into_iter()
            .filter(|b| criteria.matches(b))
            .filter(|b| criteria.category_id.map_or(true, |c| self.linked_to(b.id, c)))
            .collect();
        Ok(page(&matching, skip, limit))
    }

    async fn find_popular(&self, limit: u32) -> FolioResult<Vec<Book>> {
        self.calls.hit("find_popular");
        let mut rated: Vec<Book> = self.sorted().into_iter().filter(Book::is_rated).collect();
        rated.sort_by(|a, b| {
            b.average_rating
                .total_cmp(&a.average_rating)
                .then(b.ratings_count.cmp(&a.ratings_count))
        });
        rated.truncate(limit as usize);
        Ok(rated)
    }

    async fn find_by_category(&self, category_id: CategoryId, limit: u32) -> FolioResult<Vec<Book>> {
        self.calls.hit("find_by_category");
        let mut books: Vec<Book> = self
            .sorted()
            .into_iter()
            .filter(|b| self.linked_to(b.id, category_id))
            .collect();
        books.truncate(limit as usize);
        Ok(books)
    }

    async fn save(&self, book: &Book) -> FolioResult<Book> {
        self.add(book.clone());
        Ok(book.clone())
    }

    async fn update(&self, book: &Book) -> FolioResult<Book> {
        self.add(book.clone());
        Ok(book.clone())
    }

    async fn delete(&self, id: BookId) -> FolioResult<bool> {
        self.links.lock().unwrap().remove(&id);
        Ok(self.books.lock().unwrap().remove(&id).is_some())
    }

    async fn set_categories(&self, book_id: BookId, category_ids: &[CategoryId]) -> FolioResult<()> {
        self.links.lock().unwrap().insert(book_id, category_ids.to_vec());
        Ok(())
    }

    async fn categories_for_books(
        &self,
        book_ids: &[BookId],
    ) -> FolioResult<HashMap<BookId, Vec<Category>>> {
        let links = self.links.lock().unwrap();
        let categories = self.categories.lock().unwrap();
        let mut result = HashMap::new();
        for book_id in book_ids {
            let Some(ids) = links.get(book_id) else { continue };
            let mut linked: Vec<Category> = ids.iter().filter_map(|id| categories.get(id).cloned()).collect();
            if linked.is_empty() {
                continue;
            }
            linked.sort_by(|a, b| a.name.cmp(&b.name));
            result.insert(*book_id, linked);
        }
        Ok(result)
    }
}

#[derive(Default)]
pub struct MockInteractionRepository {
    pub interactions: Mutex<Vec<Interaction>>,
    pub books: Mutex<HashMap<BookId, Book>>,
    pub users: Mutex<HashMap<UserId, User>>,
    pub calls: CallCounter,
}

impl MockInteractionRepository {
    pub fn add(&self, interaction: Interaction) {
        self.interactions.lock().unwrap().push(interaction);
    }

    pub fn get(&self, id: InteractionId) -> Option<Interaction> {
        self.interactions.lock().unwrap().iter().find(|i| i.id == id).cloned()
    }

    fn newest_first(&self) -> Vec<Interaction> {
        let mut interactions = self.interactions.lock().unwrap().clone();
        interactions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        interactions
    }

    fn books_with(&self, user_id: UserId, kind: InteractionType) -> Vec<Book> {
        let books = self.books.lock().unwrap();
        let mut seen = Vec::new();
        for interaction in self.newest_first() {
            if interaction.user_id == user_id
                && interaction.interaction_type == kind
                && !seen.iter().any(|b: &Book| b.id == interaction.book_id)
            {
                if let Some(book) = books.get(&interaction.book_id) {
                    seen.push(book.clone());
                }
            }
        }
        seen
    }
}

#[async_trait]
impl InteractionRepository for MockInteractionRepository {
    async fn find_by_id(&self, id: InteractionId) -> FolioResult<Option<Interaction>> {
        Ok(self.get(id))
    }

    async fn find_by_user(&self, user_id: UserId, limit: u32) -> FolioResult<Vec<Interaction>> {
        self.calls.hit("find_by_user");
        let mut found: Vec<Interaction> =
            self.newest_first().into_iter().filter(|i| i.user_id == user_id).collect();
        found.truncate(limit as usize);
        Ok(found)
    }

    async fn find_by_book(&self, book_id: BookId, limit: u32) -> FolioResult<Vec<Interaction>> {
        self.calls.hit("find_by_book");
        let mut found: Vec<Interaction> =
            self.newest_first().into_iter().filter(|i| i.book_id == book_id).collect();
        found.truncate(limit as usize);
        Ok(found)
    }

    async fn find_user_book(
        &self,
        user_id: UserId,
        book_id: BookId,
        interaction_type: Option<InteractionType>,
    ) -> FolioResult<Option<Interaction>> {
        self.calls.hit("find_user_book");
        Ok(self.newest_first().into_iter().find(|i| {
            i.user_id == user_id
                && i.book_id == book_id
                && interaction_type.map_or(true, |t| i.interaction_type == t)
        }))
    }

    async fn save(&self, interaction: &Interaction) -> FolioResult<Interaction> {
        self.add(interaction.clone());
        Ok(interaction.clone())
    }

    async fn update(&self, interaction: &Interaction) -> FolioResult<Interaction> {
        let mut interactions = self.interactions.lock().unwrap();
        if let Some(stored) = interactions.iter_mut().find(|i| i.id == interaction.id) {
            *stored = interaction.clone();
        }
        Ok(interaction.clone())
    }

    async fn delete(&self, id: InteractionId) -> FolioResult<bool> {
        let mut interactions = self.interactions.lock().unwrap();
        let before = interactions.len();
        interactions.retain(|i| i.id != id);
        Ok(interactions.len() < before)
    }

    async fn ratings_for_book(&self, book_id: BookId) -> FolioResult<Vec<f64>> {
        Ok(self
            .interactions
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.book_id == book_id && i.is_rating())
            .filter_map(|i| i.rating)
            .collect())
    }

    async fn rated_books(&self, user_id: UserId) -> FolioResult<Vec<Book>> {
        self.calls.hit("rated_books");
        Ok(self.books_with(user_id, InteractionType::Rate))
    }

    async fn bookmarked_books(&self, user_id: UserId) -> FolioResult<Vec<Book>> {
        self.calls.hit("bookmarked_books");
        Ok(self.books_with(user_id, InteractionType::Bookmark))
    }

    async fn users_who_rated(&self, book_id: BookId, min_rating: f64) -> FolioResult<Vec<User>> {
        self.calls.hit("users_who_rated");
        let users = self.users.lock().unwrap();
        let mut found: Vec<User> = Vec::new();
        for interaction in self.interactions.lock().unwrap().iter() {
            if interaction.book_id == book_id
                && interaction.is_rating()
                && interaction.rating.is_some_and(|r| r >= min_rating)
                && !found.iter().any(|u| u.id == interaction.user_id)
            {
                if let Some(user) = users.get(&interaction.user_id) {
                    found.push(user.clone());
                }
            }
        }
        Ok(found)
    }
}

#[derive(Default)]
pub struct MockRecommendationRepository {
    pub recommendations: Mutex<HashMap<RecommendationId, BookRecommendation>>,
    pub calls: CallCounter,
}

impl MockRecommendationRepository {
    pub fn add(&self, recommendation: BookRecommendation) {
        self.recommendations.lock().unwrap().insert(recommendation.id, recommendation);
    }

    pub fn get(&self, id: RecommendationId) -> Option<BookRecommendation> {
        self.recommendations.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl RecommendationRepository for MockRecommendationRepository {
    async fn find_by_id(&self, id: RecommendationId) -> FolioResult<Option<BookRecommendation>> {
        self.calls.hit("find_by_id");
        Ok(self.get(id))
    }

    async fn find_for_user(
        &self,
        user_id: UserId,
        filter: &RecommendationFilter,
    ) -> FolioResult<Vec<BookRecommendation>> {
        self.calls.hit("find_for_user");
        let mut found: Vec<BookRecommendation> = self
            .recommendations
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.user_id == user_id && filter.matches(r))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.score.total_cmp(&a.score));
        found.truncate(filter.limit as usize);
        Ok(found)
    }

    async fn save(&self, recommendation: &BookRecommendation) -> FolioResult<BookRecommendation> {
        self.add(recommendation.clone());
        Ok(recommendation.clone())
    }

    async fn update(&self, recommendation: &BookRecommendation) -> FolioResult<BookRecommendation> {
        self.add(recommendation.clone());
        Ok(recommendation.clone())
    }
}

/// Reversible stand-in for Argon2 so tests stay fast.
#[derive(Default)]
pub struct PlainHasher {
    pub hashes: AtomicUsize,
}

impl PasswordHasherInterface for PlainHasher {
    fn hash(&self, password: &str) -> FolioResult<String> {
        self.hashes.fetch_add(1, Ordering::SeqCst);
        Ok(format!("plain${}", password))
    }

    fn verify(&self, password: &str, hash: &str) -> FolioResult<bool> {
        Ok(hash == format!("plain${}", password))
    }
}
