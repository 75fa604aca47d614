//! Portfolio items and testimonials.

use lummi_core::{
    NewPortfolioItem, NewTestimonial, PortfolioItem, PortfolioItemId, Testimonial, TestimonialId,
};
use serde::Serialize;

use crate::client::SupabaseClient;
use crate::error::SupabaseError;
use crate::rest::Query;
use crate::tables;

impl SupabaseClient {
    /// Published portfolio items, in display order.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or a row does not map.
    pub async fn published_portfolio(&self) -> Result<Vec<PortfolioItem>, SupabaseError> {
        let query = Query::table(tables::PORTFOLIO_ITEMS)
            .select("*")
            .eq("is_published", true)
            .order("order_index", true);
        self.select(&query, None).await
    }

    /// Published testimonials, in display order.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or a row does not map.
    pub async fn published_testimonials(&self) -> Result<Vec<Testimonial>, SupabaseError> {
        let query = Query::table(tables::TESTIMONIALS)
            .select("*")
            .eq("is_published", true)
            .order("order_index", true);
        self.select(&query, None).await
    }

    // =========================================================================
    // Admin access (user token, RLS decides)
    // =========================================================================

    /// Every portfolio item, published or not.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    pub async fn list_portfolio(&self, token: &str) -> Result<Vec<PortfolioItem>, SupabaseError> {
        let query = Query::table(tables::PORTFOLIO_ITEMS)
            .select("*")
            .order("order_index", true);
        self.select(&query, Some(token)).await
    }

    /// A single portfolio item.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    pub async fn get_portfolio_item(
        &self,
        id: PortfolioItemId,
        token: &str,
    ) -> Result<Option<PortfolioItem>, SupabaseError> {
        let query = Query::table(tables::PORTFOLIO_ITEMS).select("*").eq("id", id);
        let rows: Vec<PortfolioItem> = self.select(&query, Some(token)).await?;
        Ok(rows.into_iter().next())
    }

    /// # Errors
    ///
    /// Returns error if the insert is rejected.
    pub async fn create_portfolio_item(
        &self,
        item: &NewPortfolioItem,
        token: &str,
    ) -> Result<(), SupabaseError> {
        self.insert(tables::PORTFOLIO_ITEMS, item, Some(token)).await
    }

    /// Upsert the full record, keyed by id.
    ///
    /// # Errors
    ///
    /// Returns error if the upsert is rejected.
    pub async fn upsert_portfolio_item(
        &self,
        item: &PortfolioItem,
        token: &str,
    ) -> Result<(), SupabaseError> {
        self.upsert(tables::PORTFOLIO_ITEMS, item, None, Some(token))
            .await
    }

    /// Patch individual columns of one item.
    ///
    /// # Errors
    ///
    /// Returns error if the update is rejected.
    pub async fn update_portfolio_item<P: Serialize + ?Sized>(
        &self,
        id: PortfolioItemId,
        patch: &P,
        token: &str,
    ) -> Result<(), SupabaseError> {
        let query = Query::table(tables::PORTFOLIO_ITEMS).eq("id", id);
        self.update(&query, patch, Some(token)).await
    }

    /// Every testimonial, published or not.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    pub async fn list_testimonials(&self, token: &str) -> Result<Vec<Testimonial>, SupabaseError> {
        let query = Query::table(tables::TESTIMONIALS)
            .select("*")
            .order("order_index", true);
        self.select(&query, Some(token)).await
    }

    /// # Errors
    ///
    /// Returns error if the request fails.
    pub async fn get_testimonial(
        &self,
        id: TestimonialId,
        token: &str,
    ) -> Result<Option<Testimonial>, SupabaseError> {
        let query = Query::table(tables::TESTIMONIALS).select("*").eq("id", id);
        let rows: Vec<Testimonial> = self.select(&query, Some(token)).await?;
        Ok(rows.into_iter().next())
    }

    /// # Errors
    ///
    /// Returns error if the insert is rejected.
    pub async fn create_testimonial(
        &self,
        row: &NewTestimonial,
        token: &str,
    ) -> Result<(), SupabaseError> {
        self.insert(tables::TESTIMONIALS, row, Some(token)).await
    }

    /// # Errors
    ///
    /// Returns error if the upsert is rejected.
    pub async fn upsert_testimonial(
        &self,
        row: &Testimonial,
        token: &str,
    ) -> Result<(), SupabaseError> {
        self.upsert(tables::TESTIMONIALS, row, None, Some(token))
            .await
    }

    /// # Errors
    ///
    /// Returns error if the update is rejected.
    pub async fn update_testimonial<P: Serialize + ?Sized>(
        &self,
        id: TestimonialId,
        patch: &P,
        token: &str,
    ) -> Result<(), SupabaseError> {
        let query = Query::table(tables::TESTIMONIALS).eq("id", id);
        self.update(&query, patch, Some(token)).await
    }
}
